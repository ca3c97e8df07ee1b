use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::cli::DeleteActArgs;
use crate::store::{ActSelector, ArticleStore};
use crate::util::{normalize_diacritics, normalize_whitespace};

pub fn run(args: DeleteActArgs) -> Result<()> {
    let db_path = args.location.resolved_db_path();
    if !db_path.exists() {
        bail!("database file missing: {}", db_path.display());
    }

    let selector = selector_from_args(&args)?;
    let mut store = ArticleStore::open(&db_path)?;
    let deleted = store.delete_act(&selector)?;

    if deleted == 0 {
        warn!(selector = ?selector, "no matching act found");
    } else {
        info!(selector = ?selector, deleted, "act removed with its articles");
    }

    Ok(())
}

fn selector_from_args(args: &DeleteActArgs) -> Result<ActSelector> {
    if let Some(source_url) = &args.source_url {
        return Ok(ActSelector::SourceUrl(source_url.clone()));
    }

    let (Some(act_type), Some(act_number)) = (&args.act_type, &args.act_number) else {
        bail!("delete-act needs --act-type and --number, or --source-url");
    };

    Ok(ActSelector::Identity {
        act_type: normalize_whitespace(&normalize_diacritics(act_type)).to_uppercase(),
        act_number: act_number.trim().to_string(),
        year: args.year,
    })
}

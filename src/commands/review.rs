use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::ReviewArgs;
use crate::store::{ArticleStore, ReviewEntry};

pub fn run(args: ReviewArgs) -> Result<()> {
    let db_path = args.location.resolved_db_path();
    if !db_path.exists() {
        warn!(path = %db_path.display(), "database file missing");
        return Ok(());
    }

    let store = ArticleStore::open(&db_path)?;
    let entries = store.acts_needing_review(args.limit)?;
    info!(path = %db_path.display(), flagged = entries.len(), "review queue loaded");

    if args.json {
        write_json_response(&entries)
    } else {
        write_text_response(&entries)
    }
}

fn write_json_response(entries: &[ReviewEntry]) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, entries)
        .context("failed to serialize review json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

fn write_text_response(entries: &[ReviewEntry]) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "Acts needing review: {}", entries.len())?;
    for entry in entries {
        let year = entry
            .year
            .map(|year| year.to_string())
            .unwrap_or_else(|| "?".to_string());
        writeln!(output)?;
        writeln!(
            output,
            "{} {}/{} v{} confidence={:.3} strategy={} articles={}",
            entry.act_type,
            entry.act_number,
            year,
            entry.version,
            entry.confidence,
            entry.strategy.as_deref().unwrap_or("none"),
            entry.articles,
        )?;
        writeln!(output, "  {}", entry.title)?;
        writeln!(output, "  {}", entry.source_url)?;
        for anomaly in &entry.anomalies {
            writeln!(output, "  - {anomaly}")?;
        }
    }

    output.flush()?;
    Ok(())
}

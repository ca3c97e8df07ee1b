use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::model::RunManifest;
use crate::store::ArticleStore;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.location.manifest_dir();
    let db_path = args.location.resolved_db_path();

    info!(cache_root = %args.location.cache_root.display(), "status requested");

    match latest_run_manifest(&manifest_dir)? {
        Some(path) => {
            let raw =
                fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
            let manifest: RunManifest = serde_json::from_slice(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?;

            info!(
                path = %path.display(),
                run_id = %manifest.run_id,
                status = %manifest.status,
                started_at = %manifest.started_at,
                updated_at = %manifest.updated_at,
                documents = manifest.counts.documents_total,
                succeeded = manifest.counts.documents_succeeded,
                failed = manifest.counts.documents_failed,
                with_warnings = manifest.counts.documents_with_warnings,
                acts_created = manifest.counts.acts_created,
                acts_updated = manifest.counts.acts_updated,
                acts_unchanged = manifest.counts.acts_unchanged,
                "loaded latest run manifest"
            );
        }
        None => warn!(path = %manifest_dir.display(), "no run manifest found"),
    }

    if db_path.exists() {
        let store = ArticleStore::open(&db_path)?;
        let counts = store.counts()?;

        info!(
            path = %db_path.display(),
            acts = counts.acts,
            articles = counts.articles,
            needs_review = counts.acts_needing_review,
            scrape_failures = counts.scrape_failures,
            "database status"
        );
    } else {
        warn!(path = %db_path.display(), "database file missing");
    }

    Ok(())
}

/// Manifest names embed a compact UTC timestamp, so the lexically greatest
/// timestamp is the most recent run regardless of command.
fn latest_run_manifest(manifest_dir: &Path) -> Result<Option<PathBuf>> {
    if !manifest_dir.exists() {
        return Ok(None);
    }

    let mut latest: Option<(String, PathBuf)> = None;
    for entry in fs::read_dir(manifest_dir)
        .with_context(|| format!("failed to list {}", manifest_dir.display()))?
    {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let Some(stamp) = name
            .strip_suffix(".json")
            .and_then(|stem| stem.split_once("_run_"))
            .map(|(_, stamp)| stamp.to_string())
        else {
            continue;
        };

        if latest.as_ref().is_none_or(|(best, _)| stamp > *best) {
            latest = Some((stamp, path));
        }
    }

    Ok(latest.map(|(_, path)| path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_manifest_is_chosen_by_timestamp_across_commands() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in [
            "scrape_run_20240101T000000Z.json",
            "parse_run_20240301T120000Z.json",
            "scrape_run_20240201T000000Z.json",
            "notes.json",
        ] {
            fs::write(dir.path().join(name), "{}").expect("write manifest");
        }

        let latest = latest_run_manifest(dir.path()).expect("scan");

        assert_eq!(
            latest,
            Some(dir.path().join("parse_run_20240301T120000Z.json"))
        );
    }

    #[test]
    fn missing_manifest_dir_is_not_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let latest = latest_run_manifest(&dir.path().join("absent")).expect("scan");
        assert_eq!(latest, None);
    }
}

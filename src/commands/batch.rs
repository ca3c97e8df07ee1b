//! Per-document bookkeeping shared by `scrape` and `parse`: artifact
//! writes, store import, failure collection and the run manifest.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::cli::ArtifactFormat;
use crate::model::{
    DocumentFailure, DocumentReport, ParseResult, RunCounts, RunManifest, RunPaths,
};
use crate::output::write_artifacts;
use crate::store::{ArticleStore, UpsertStatus};
use crate::util::{now_utc_string, utc_compact_string, write_json_pretty};

const MANIFEST_VERSION: u32 = 1;

pub(crate) struct RunClock {
    pub(crate) started_ts: DateTime<Utc>,
    pub(crate) started_at: String,
    pub(crate) run_id: String,
}

impl RunClock {
    pub(crate) fn start() -> Self {
        let started_ts = Utc::now();
        Self {
            started_ts,
            started_at: now_utc_string(),
            run_id: format!("run-{}", utc_compact_string(started_ts)),
        }
    }

    pub(crate) fn manifest_path(&self, manifest_dir: &Path, command: &str) -> PathBuf {
        manifest_dir.join(format!(
            "{command}_run_{}.json",
            utc_compact_string(self.started_ts)
        ))
    }
}

pub(crate) struct BatchRecorder {
    run_id: String,
    output_dir: PathBuf,
    formats: Vec<ArtifactFormat>,
    store: Option<ArticleStore>,
    counts: RunCounts,
    documents: Vec<DocumentReport>,
    failures: Vec<DocumentFailure>,
    warnings: Vec<String>,
}

impl BatchRecorder {
    pub(crate) fn new(
        run_id: &str,
        output_dir: PathBuf,
        formats: Vec<ArtifactFormat>,
        store: Option<ArticleStore>,
    ) -> Self {
        Self {
            run_id: run_id.to_string(),
            output_dir,
            formats,
            store,
            counts: RunCounts::default(),
            documents: Vec::new(),
            failures: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Records one document's outcome. Never fails: every per-document
    /// error ends up in the failure list and the batch keeps going.
    pub(crate) fn record(&mut self, source_url: &str, outcome: Result<ParseResult>) {
        match outcome {
            Ok(result) if result.is_failure() => {
                let reason = format!(
                    "no articles identified in {}",
                    result.metadata.display_key()
                );
                self.record_failure(source_url, &reason);
            }
            Ok(result) => {
                if let Err(err) = self.record_parsed(&result) {
                    self.record_failure(source_url, &format!("{err:#}"));
                }
            }
            Err(err) => self.record_failure(source_url, &format!("{err:#}")),
        }
    }

    pub(crate) fn add_warning(&mut self, warning: String) {
        warn!(warning = %warning, "run warning");
        self.warnings.push(warning);
    }

    fn record_parsed(&mut self, result: &ParseResult) -> Result<()> {
        let artifacts = write_artifacts(&self.output_dir, result, &self.formats)?;

        let upsert = match self.store.as_mut() {
            Some(store) => Some(store.upsert_act(result)?),
            None => None,
        };

        let quality = &result.quality;
        self.counts.documents_total += 1;
        self.counts.documents_succeeded += 1;
        self.counts.duplicates_removed += quality.duplicates_removed;
        if quality.has_warnings() {
            self.counts.documents_with_warnings += 1;
        }
        if let Some(outcome) = &upsert {
            match outcome.status {
                UpsertStatus::Created => self.counts.acts_created += 1,
                UpsertStatus::Updated => self.counts.acts_updated += 1,
                UpsertStatus::Unchanged => self.counts.acts_unchanged += 1,
            }
            self.counts.articles_written += outcome.articles_written;
        }

        if quality.needs_review {
            warn!(
                source_url = %result.source_url,
                act = %result.metadata.display_key(),
                confidence = quality.confidence,
                anomalies = quality.anomalies.len(),
                "document flagged for review"
            );
        }
        info!(
            source_url = %result.source_url,
            act = %result.metadata.display_key(),
            articles = result.articles.len(),
            confidence = quality.confidence,
            store = upsert.as_ref().map(|outcome| outcome.status.as_str()).unwrap_or("skipped"),
            "document processed"
        );

        self.documents.push(DocumentReport {
            source_url: result.source_url.clone(),
            act: result.metadata.display_key(),
            strategy: quality.strategy,
            articles: result.articles.len(),
            confidence: quality.confidence,
            needs_review: quality.needs_review,
            anomalies: quality
                .anomalies
                .iter()
                .map(|anomaly| format!("{}: {}", anomaly.kind.as_str(), anomaly.message))
                .collect(),
            artifacts: artifacts
                .iter()
                .map(|path| path.display().to_string())
                .collect(),
            store_outcome: upsert.map(|outcome| outcome.status.as_str().to_string()),
        });

        Ok(())
    }

    fn record_failure(&mut self, source_url: &str, reason: &str) {
        warn!(source_url, reason, "document failed");

        self.counts.documents_total += 1;
        self.counts.documents_failed += 1;
        self.failures.push(DocumentFailure {
            source_url: source_url.to_string(),
            reason: reason.to_string(),
        });

        let stored = self
            .store
            .as_ref()
            .map(|store| store.record_failure(source_url, reason, Some(&self.run_id)));
        if let Some(Err(err)) = stored {
            self.add_warning(format!(
                "failed to record scrape failure for {source_url}: {err:#}"
            ));
        }
    }

    pub(crate) fn finish(
        self,
        clock: &RunClock,
        command: String,
        paths: RunPaths,
    ) -> RunManifest {
        let status = if self.failures.is_empty() {
            "completed"
        } else {
            "completed_with_failures"
        };

        RunManifest {
            manifest_version: MANIFEST_VERSION,
            run_id: self.run_id,
            status: status.to_string(),
            started_at: clock.started_at.clone(),
            updated_at: now_utc_string(),
            command,
            paths,
            counts: self.counts,
            documents: self.documents,
            failures: self.failures,
            warnings: self.warnings,
        }
    }
}

pub(crate) fn write_manifest(path: &Path, manifest: &RunManifest) -> Result<()> {
    write_json_pretty(path, manifest)?;
    info!(path = %path.display(), "wrote run manifest");
    Ok(())
}

pub(crate) fn print_summary(manifest: &RunManifest) -> Result<()> {
    let counts = &manifest.counts;
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "Run: {} ({})", manifest.run_id, manifest.status)?;
    writeln!(
        output,
        "Documents: total={} succeeded={} failed={} with_warnings={}",
        counts.documents_total,
        counts.documents_succeeded,
        counts.documents_failed,
        counts.documents_with_warnings,
    )?;
    writeln!(
        output,
        "Acts: created={} updated={} unchanged={} articles_written={} duplicates_removed={}",
        counts.acts_created,
        counts.acts_updated,
        counts.acts_unchanged,
        counts.articles_written,
        counts.duplicates_removed,
    )?;
    for failure in &manifest.failures {
        writeln!(output, "FAILED {}: {}", failure.source_url, failure.reason)?;
    }
    writeln!(output, "Manifest: {}", manifest.paths.manifest_path)?;
    output.flush().context("failed to flush summary")?;

    info!(
        run_id = %manifest.run_id,
        documents = counts.documents_total,
        succeeded = counts.documents_succeeded,
        failed = counts.documents_failed,
        with_warnings = counts.documents_with_warnings,
        acts_created = counts.acts_created,
        acts_updated = counts.acts_updated,
        acts_unchanged = counts.acts_unchanged,
        articles_written = counts.articles_written,
        "run completed"
    );

    Ok(())
}

pub(crate) fn open_store(no_store: bool, db_path: &Path) -> Result<Option<ArticleStore>> {
    if no_store {
        return Ok(None);
    }
    ArticleStore::open(db_path).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::LegislationParser;

    const LAW: &str = r#"<html><body>
<div class="S_DEN">LEGE nr. 121 din 30/04/2024</div>
<span class="S_TTL_TTL">TITLUL I</span>
<span class="S_ART_TTL">Articolul 1</span><span class="S_ART_BDY">Prezenta lege stabilește cadrul general.</span>
<span class="S_ART_TTL">Articolul 2</span><span class="S_ART_BDY">Prezenta lege intră în vigoare la 30 de zile.</span>
</body></html>"#;

    const NO_ARTICLES: &str = r#"<html><body>
<div class="S_DEN">LEGE nr. 5 din 01/02/2020</div>
<p>Text fără articole.</p>
</body></html>"#;

    #[test]
    fn batch_collects_successes_and_failures_and_continues() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ArticleStore::open(&dir.path().join("db.sqlite")).expect("store");
        let parser = LegislationParser::new().expect("parser");
        let clock = RunClock::start();
        let mut recorder = BatchRecorder::new(
            &clock.run_id,
            dir.path().join("out"),
            vec![ArtifactFormat::Csv],
            Some(store),
        );

        let parse = |url: &str, content: &str| {
            parser
                .parse_document(url, content)
                .map_err(anyhow::Error::from)
        };

        recorder.record("https://a.example/1", parse("https://a.example/1", LAW));
        recorder.record("https://a.example/2", parse("https://a.example/2", NO_ARTICLES));
        recorder.record("https://a.example/3", parse("https://a.example/3", "<p>nimic</p>"));
        recorder.record("https://a.example/1", parse("https://a.example/1", LAW));

        let manifest = recorder.finish(
            &clock,
            "legiscrape scrape".to_string(),
            RunPaths {
                cache_root: dir.path().display().to_string(),
                output_dir: dir.path().join("out").display().to_string(),
                manifest_path: String::new(),
                db_path: None,
            },
        );

        assert_eq!(manifest.status, "completed_with_failures");
        assert_eq!(manifest.counts.documents_total, 4);
        assert_eq!(manifest.counts.documents_succeeded, 2);
        assert_eq!(manifest.counts.documents_failed, 2);
        assert_eq!(manifest.counts.acts_created, 1);
        assert_eq!(manifest.counts.acts_unchanged, 1);
        assert_eq!(manifest.counts.articles_written, 2);
        assert_eq!(manifest.failures[0].source_url, "https://a.example/2");
        assert!(manifest.failures[0].reason.contains("no articles identified"));
        assert!(manifest.failures[1].reason.contains("act type and number not found"));
        assert_eq!(manifest.documents[0].store_outcome.as_deref(), Some("created"));
        assert!(dir.path().join("out").join("lege_121_2024.csv").exists());
    }

    #[test]
    fn manifest_path_carries_command_and_timestamp() {
        let clock = RunClock::start();
        let path = clock.manifest_path(Path::new("/tmp/manifests"), "scrape");
        let name = path.file_name().and_then(|name| name.to_str()).unwrap_or("");

        assert!(name.starts_with("scrape_run_"));
        assert!(name.ends_with("Z.json"));
    }
}

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

use crate::cli::ScrapeArgs;
use crate::commands::batch::{
    BatchRecorder, RunClock, open_store, print_summary, write_manifest,
};
use crate::extract::LegislationParser;
use crate::fetch::{DocumentFetcher, FetchedDocument};
use crate::model::{ParseResult, RunPaths};
use crate::output::artifact_stem;
use crate::util::{ensure_directory, slugify, write_text_file};

struct WorkOutcome {
    source_url: String,
    raw: Option<String>,
    result: Result<ParseResult>,
}

pub fn run(args: ScrapeArgs) -> Result<()> {
    let clock = RunClock::start();
    let cache_root = args.location.cache_root.clone();
    let manifest_dir = args.location.manifest_dir();
    ensure_directory(&manifest_dir)?;

    let manifest_path = clock.manifest_path(&manifest_dir, "scrape");
    let output_dir = args.output.resolved_output_dir(&cache_root);
    let db_path = args.location.resolved_db_path();
    let raw_dir = cache_root.join("raw");

    let urls = collect_urls(&args)?;
    if urls.is_empty() {
        bail!("no URLs given; pass --url or --url-list");
    }

    let workers = args.workers.clamp(1, urls.len());
    info!(
        run_id = %clock.run_id,
        urls = urls.len(),
        workers,
        printable = args.printable,
        "starting scrape"
    );

    let parser = LegislationParser::new()?;
    let fetcher = DocumentFetcher::new(&args.user_agent, args.timeout_secs, args.printable)?;
    let store = open_store(args.output.no_store, &db_path)?;
    let mut recorder = BatchRecorder::new(
        &clock.run_id,
        output_dir.clone(),
        args.output.resolved_formats(),
        store,
    );

    let next_url = AtomicUsize::new(0);
    let (result_tx, result_rx) = mpsc::channel::<(usize, WorkOutcome)>();

    thread::scope(|scope| {
        for _ in 0..workers {
            let result_tx = result_tx.clone();
            let (urls, next_url, parser, fetcher) = (&urls, &next_url, &parser, &fetcher);
            let keep_raw = args.keep_raw;
            scope.spawn(move || {
                loop {
                    let index = next_url.fetch_add(1, Ordering::Relaxed);
                    let Some(url) = urls.get(index) else {
                        break;
                    };
                    let outcome = fetch_and_parse(fetcher, parser, url, keep_raw);
                    if result_tx.send((index, outcome)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        // Outcomes arrive in completion order; artifacts and store rows are
        // written in input order.
        let mut pending = HashMap::<usize, WorkOutcome>::new();
        let mut next_to_record = 0usize;
        for (index, outcome) in result_rx {
            pending.insert(index, outcome);
            while let Some(outcome) = pending.remove(&next_to_record) {
                record_outcome(&mut recorder, &raw_dir, outcome);
                next_to_record += 1;
            }
        }
    });

    let manifest = recorder.finish(
        &clock,
        render_scrape_command(&args),
        RunPaths {
            cache_root: cache_root.display().to_string(),
            output_dir: output_dir.display().to_string(),
            manifest_path: manifest_path.display().to_string(),
            db_path: (!args.output.no_store).then(|| db_path.display().to_string()),
        },
    );

    write_manifest(&manifest_path, &manifest)?;
    print_summary(&manifest)?;

    Ok(())
}

fn fetch_and_parse(
    fetcher: &DocumentFetcher,
    parser: &LegislationParser,
    url: &str,
    keep_raw: bool,
) -> WorkOutcome {
    let document = match fetcher.fetch(url) {
        Ok(document) => document,
        Err(err) => {
            return WorkOutcome {
                source_url: url.to_string(),
                raw: None,
                result: Err(err),
            };
        }
    };

    let FetchedDocument {
        source_url,
        fetched_url,
        body,
    } = document;
    if fetched_url != source_url {
        debug!(source_url = %source_url, fetched_url = %fetched_url, "read printable rendering");
    }
    let result = parser
        .parse_document(&source_url, &body)
        .map_err(anyhow::Error::from);

    WorkOutcome {
        source_url,
        raw: keep_raw.then_some(body),
        result,
    }
}

fn record_outcome(recorder: &mut BatchRecorder, raw_dir: &Path, outcome: WorkOutcome) {
    if let Some(raw) = &outcome.raw {
        let stem = match &outcome.result {
            Ok(result) => artifact_stem(&result.metadata),
            Err(_) => slugify(&outcome.source_url),
        };
        let raw_path = raw_dir.join(format!("{stem}.html"));
        if let Err(err) = write_text_file(&raw_path, raw) {
            recorder.add_warning(format!(
                "failed to keep raw document for {}: {err:#}",
                outcome.source_url
            ));
        }
    }

    recorder.record(&outcome.source_url, outcome.result);
}

fn collect_urls(args: &ScrapeArgs) -> Result<Vec<String>> {
    let mut urls = args
        .urls
        .iter()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .collect::<Vec<String>>();

    if let Some(list_path) = &args.url_list {
        let raw = fs::read_to_string(list_path)
            .with_context(|| format!("failed to read {}", list_path.display()))?;
        urls.extend(parse_url_list(&raw));
    }

    let mut seen = HashSet::<String>::new();
    let before = urls.len();
    urls.retain(|url| seen.insert(url.clone()));
    if urls.len() < before {
        warn!(dropped = before - urls.len(), "duplicate URLs ignored");
    }

    Ok(urls)
}

fn parse_url_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn render_scrape_command(args: &ScrapeArgs) -> String {
    let mut parts = vec![
        "legiscrape".to_string(),
        "scrape".to_string(),
        "--cache-root".to_string(),
        args.location.cache_root.display().to_string(),
    ];

    for url in &args.urls {
        parts.push("--url".to_string());
        parts.push(url.clone());
    }
    if let Some(list_path) = &args.url_list {
        parts.push("--url-list".to_string());
        parts.push(list_path.display().to_string());
    }
    for format in &args.output.formats {
        parts.push("--format".to_string());
        parts.push(format.as_str().to_string());
    }
    parts.push("--workers".to_string());
    parts.push(args.workers.to_string());
    if args.printable {
        parts.push("--printable".to_string());
    }
    if args.keep_raw {
        parts.push("--keep-raw".to_string());
    }
    if args.output.no_store {
        parts.push("--no-store".to_string());
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ArtifactFormat, OutputArgs, StoreLocation};
    use crate::model::RunManifest;

    #[test]
    fn url_list_skips_comments_and_blank_lines() {
        let raw = "\
# legi 2024
https://legislatie.just.ro/Public/DetaliiDocument/281585

  https://legislatie.just.ro/Public/DetaliiDocument/281600  
# end
";

        assert_eq!(
            parse_url_list(raw),
            vec![
                "https://legislatie.just.ro/Public/DetaliiDocument/281585".to_string(),
                "https://legislatie.just.ro/Public/DetaliiDocument/281600".to_string(),
            ]
        );
    }

    #[test]
    fn local_documents_flow_through_fetch_and_parse() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ordin.html");
        fs::write(
            &path,
            r#"<div class="S_DEN">ORDIN nr. 100 din 01.06.2024</div>
<span class="S_ART_TTL">Articolul 1</span><span class="S_ART_BDY">Se aprobă regulamentul de organizare.</span>"#,
        )
        .expect("write fixture");

        let fetcher =
            DocumentFetcher::new(crate::fetch::DEFAULT_USER_AGENT, 5, false).expect("fetcher");
        let parser = LegislationParser::new().expect("parser");
        let url = path.display().to_string();

        let outcome = fetch_and_parse(&fetcher, &parser, &url, true);

        let result = outcome.result.expect("parsed");
        assert_eq!(result.metadata.act_type, "ORDIN");
        assert_eq!(result.articles.len(), 1);
        assert!(outcome.raw.is_some());
        assert_eq!(outcome.source_url, url);
    }

    #[test]
    fn concurrent_batch_records_documents_in_input_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let inputs = dir.path().join("inputs");
        fs::create_dir_all(&inputs).expect("inputs dir");

        let mut urls = Vec::new();
        let mut expected_documents = Vec::new();
        let mut expected_failures = Vec::new();
        for index in 0..12 {
            let path = inputs.join(format!("act_{index:02}.html"));
            let url = path.display().to_string();
            match index % 4 {
                // Never written: the fetch itself fails.
                3 => expected_failures.push(url.clone()),
                2 => {
                    fs::write(
                        &path,
                        format!(r#"<div class="S_DEN">ORDIN nr. {index} din 01.06.2024</div><p>Fără articole.</p>"#),
                    )
                    .expect("write fixture");
                    expected_failures.push(url.clone());
                }
                _ => {
                    fs::write(
                        &path,
                        format!(
                            r#"<div class="S_DEN">ORDIN nr. {index} din 01.06.2024</div>
<span class="S_ART_TTL">Articolul 1</span><span class="S_ART_BDY">Se aprobă regulamentul nr. {index}.</span>"#
                        ),
                    )
                    .expect("write fixture");
                    expected_documents.push(url.clone());
                }
            }
            urls.push(url);
        }

        let cache_root = dir.path().join("cache");
        let args = ScrapeArgs {
            location: StoreLocation {
                cache_root: cache_root.clone(),
                db_path: None,
            },
            output: OutputArgs {
                output_dir: None,
                formats: vec![ArtifactFormat::Csv],
                no_store: false,
            },
            urls,
            url_list: None,
            workers: 4,
            timeout_secs: 5,
            user_agent: crate::fetch::DEFAULT_USER_AGENT.to_string(),
            printable: false,
            keep_raw: false,
        };

        run(args).expect("scrape run");

        let manifest_dir = cache_root.join("manifests");
        let manifest_path = fs::read_dir(&manifest_dir)
            .expect("manifest dir")
            .map(|entry| entry.expect("dir entry").path())
            .find(|path| path.extension().is_some_and(|ext| ext == "json"))
            .expect("manifest written");
        let manifest: RunManifest =
            serde_json::from_str(&fs::read_to_string(&manifest_path).expect("read manifest"))
                .expect("manifest json");

        let documents: Vec<&str> = manifest
            .documents
            .iter()
            .map(|document| document.source_url.as_str())
            .collect();
        let failures: Vec<&str> = manifest
            .failures
            .iter()
            .map(|failure| failure.source_url.as_str())
            .collect();
        assert_eq!(documents, expected_documents);
        assert_eq!(failures, expected_failures);
        assert_eq!(manifest.counts.documents_total, 12);
        assert_eq!(manifest.counts.documents_succeeded, 6);
        assert_eq!(manifest.counts.documents_failed, 6);
        assert_eq!(manifest.counts.acts_created, 6);
    }
}

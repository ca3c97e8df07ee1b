use std::path::Path;

use anyhow::{Result, bail};
use tracing::info;

use crate::cli::ParseArgs;
use crate::commands::batch::{
    BatchRecorder, RunClock, open_store, print_summary, write_manifest,
};
use crate::extract::LegislationParser;
use crate::fetch::read_local_document;
use crate::model::{ParseResult, RunPaths};
use crate::util::ensure_directory;

pub fn run(args: ParseArgs) -> Result<()> {
    if args.source_url.is_some() && args.paths.len() > 1 {
        bail!("--source-url applies to a single input file, got {}", args.paths.len());
    }

    let clock = RunClock::start();
    let cache_root = args.location.cache_root.clone();
    let manifest_dir = args.location.manifest_dir();
    ensure_directory(&manifest_dir)?;

    let manifest_path = clock.manifest_path(&manifest_dir, "parse");
    let output_dir = args.output.resolved_output_dir(&cache_root);
    let db_path = args.location.resolved_db_path();

    info!(run_id = %clock.run_id, files = args.paths.len(), "starting parse");

    let parser = LegislationParser::new()?;
    let store = open_store(args.output.no_store, &db_path)?;
    let mut recorder = BatchRecorder::new(
        &clock.run_id,
        output_dir.clone(),
        args.output.resolved_formats(),
        store,
    );

    for path in &args.paths {
        let source_url = args
            .source_url
            .clone()
            .unwrap_or_else(|| local_source_url(path));
        let outcome = parse_local_file(&parser, path, &source_url);
        recorder.record(&source_url, outcome);
    }

    let manifest = recorder.finish(
        &clock,
        render_parse_command(&args),
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

fn parse_local_file(
    parser: &LegislationParser,
    path: &Path,
    source_url: &str,
) -> Result<ParseResult> {
    let content = read_local_document(path)?;
    let result = parser.parse_document(source_url, &content)?;
    Ok(result)
}

fn local_source_url(path: &Path) -> String {
    let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.display())
}

fn render_parse_command(args: &ParseArgs) -> String {
    let mut parts = vec!["legiscrape".to_string(), "parse".to_string()];
    parts.extend(args.paths.iter().map(|path| path.display().to_string()));
    if let Some(source_url) = &args.source_url {
        parts.push("--source-url".to_string());
        parts.push(source_url.clone());
    }
    for format in &args.output.formats {
        parts.push("--format".to_string());
        parts.push(format.as_str().to_string());
    }
    if args.output.no_store {
        parts.push("--no-store".to_string());
    }
    parts.join(" ")
}

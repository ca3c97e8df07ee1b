//! Artifact rendering for parsed acts. The `render_*` functions are pure;
//! `write_artifacts` is the only place that touches the filesystem.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::cli::ArtifactFormat;
use crate::model::{
    ActMetadata, Article, HierarchyContext, HierarchyLevel, ParseResult, QualityReport,
    StructuralLevel,
};
use crate::util::{ensure_directory, slugify, write_text_file};

mod csv;
mod json;
mod markdown;
#[cfg(test)]
mod tests;

pub use csv::render_csv;
pub use json::render_json;
pub use markdown::render_markdown;

/// `<type-slug>_<number>_<year>`, e.g. `lege_121_2024`. Acts without a
/// recognized year use `na` so the name stays three-part.
pub fn artifact_stem(metadata: &ActMetadata) -> String {
    let year = metadata
        .year
        .map(|year| year.to_string())
        .unwrap_or_else(|| "na".to_string());
    format!(
        "{}_{}_{}",
        slugify(&metadata.act_type),
        slugify(&metadata.act_number),
        year
    )
}

pub fn render_artifact(result: &ParseResult, format: ArtifactFormat) -> Result<String> {
    match format {
        ArtifactFormat::Csv => Ok(render_csv(result)),
        ArtifactFormat::Json => render_json(result),
        ArtifactFormat::Markdown => Ok(render_markdown(result)),
    }
}

/// Writes one file per requested format into `output_dir` and returns the
/// written paths in format order. Formats requested twice are written once.
pub fn write_artifacts(
    output_dir: &Path,
    result: &ParseResult,
    formats: &[ArtifactFormat],
) -> Result<Vec<PathBuf>> {
    ensure_directory(output_dir)?;

    let stem = artifact_stem(&result.metadata);
    let mut written = Vec::<PathBuf>::new();

    for format in formats {
        let path = output_dir.join(format!("{stem}.{}", format.extension()));
        if written.contains(&path) {
            continue;
        }

        let content = render_artifact(result, *format).with_context(|| {
            format!(
                "failed to render {} artifact for {}",
                format.as_str(),
                result.metadata.display_key()
            )
        })?;
        write_text_file(&path, &content)?;
        debug!(path = %path.display(), format = format.as_str(), "wrote artifact");
        written.push(path);
    }

    Ok(written)
}

fn level_cells(level: Option<&HierarchyLevel>) -> (String, String) {
    match level {
        Some(node) => (
            node.nr.map(|nr| nr.to_string()).unwrap_or_default(),
            node.denumire.clone(),
        ),
        None => (String::new(), String::new()),
    }
}

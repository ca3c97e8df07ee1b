//! Legislative document extraction: act metadata from the document header,
//! article structure from the body, then duplicate removal and a quality
//! report.

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use tracing::debug;

use crate::model::{
    ActMetadata, Anomaly, AnomalyKind, Article, HierarchyContext, HierarchyLevel, ParseResult,
    QualityReport, Severity, StrategyKind, StructuralLevel,
};
use crate::util::{normalize_diacritics, normalize_whitespace, sha256_hex};

mod css_strategy;
mod dedup;
mod document;
mod hierarchy;
mod markers;
mod metadata;
mod numerals;
mod quality;
mod strategy;
mod text_strategy;

use css_strategy::*;
use dedup::*;
use document::*;
use hierarchy::*;
use markers::*;
use metadata::*;
use numerals::*;
use quality::*;
use strategy::*;
use text_strategy::*;

/// Lines scanned for header fields when the header CSS markers are missing.
const HEADER_SCAN_LINES: usize = 40;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("act type and number not found in document header: {source_url}")]
    MissingActIdentity { source_url: String },
}

/// Compiled marker tables plus the ordered strategy list. Built once per run
/// and shared read-only by every worker.
pub struct LegislationParser {
    patterns: MarkerPatterns,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl LegislationParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: MarkerPatterns::new().context("failed to build marker tables")?,
            strategies: default_strategies(),
        })
    }

    pub fn parse_document(
        &self,
        source_url: &str,
        content: &str,
    ) -> Result<ParseResult, ExtractError> {
        let document = SourceDocument::new(content);
        let (metadata, anomalies) = extract_metadata(&document, &self.patterns, source_url)?;
        let content_hash = sha256_hex(content);

        for strategy in &self.strategies {
            let Some(output) = strategy.attempt(&document, &self.patterns) else {
                debug!(
                    source_url,
                    strategy = strategy.kind().as_str(),
                    "strategy identified no articles"
                );
                continue;
            };

            let articles_found = output.articles.len();
            let (articles, duplicates_removed) = deduplicate_articles(output.articles);
            let quality = assess_quality(
                output.strategy,
                articles_found,
                &articles,
                duplicates_removed,
                anomalies,
            );

            debug!(
                source_url,
                act = %metadata.display_key(),
                strategy = output.strategy.as_str(),
                articles = articles.len(),
                duplicates_removed,
                confidence = quality.confidence,
                "document parsed"
            );

            return Ok(ParseResult {
                source_url: source_url.to_string(),
                content_hash,
                metadata,
                articles,
                quality,
            });
        }

        Ok(ParseResult {
            source_url: source_url.to_string(),
            content_hash,
            metadata,
            articles: Vec::new(),
            quality: failed_quality(anomalies),
        })
    }
}

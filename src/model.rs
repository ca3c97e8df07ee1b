use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralLevel {
    Title,
    Chapter,
    Section,
    Subsection,
}

impl StructuralLevel {
    pub const ALL: [StructuralLevel; 4] = [
        StructuralLevel::Title,
        StructuralLevel::Chapter,
        StructuralLevel::Section,
        StructuralLevel::Subsection,
    ];
}

/// One open level of the act's structure: the parsed number (when the
/// heading carries a Roman or Arabic numeral) and the heading as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HierarchyLevel {
    pub nr: Option<u32>,
    pub denumire: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HierarchyContext {
    pub title: Option<HierarchyLevel>,
    pub chapter: Option<HierarchyLevel>,
    pub section: Option<HierarchyLevel>,
    pub subsection: Option<HierarchyLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActMetadata {
    pub act_type: String,
    pub act_number: String,
    pub act_date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub title: String,
    pub issuing_authority: Option<String>,
    pub gazette_number: Option<String>,
    pub gazette_date: Option<NaiveDate>,
}

impl ActMetadata {
    /// Identity used for artifact names and log lines, e.g. `LEGE 121/2024`.
    pub fn display_key(&self) -> String {
        match self.year {
            Some(year) => format!("{} {}/{}", self.act_type, self.act_number, year),
            None => format!("{} {}", self.act_type, self.act_number),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub ordinal: u32,
    pub number: String,
    pub label: String,
    pub text: String,
    pub hierarchy: HierarchyContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Css,
    Text,
}

impl StrategyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Css => "css",
            StrategyKind::Text => "text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    NoArticlesIdentified,
    DateUnparsed,
    MetadataFallback,
    MissingHierarchy,
    ShortArticleBody,
    DuplicatesRemoved,
}

impl AnomalyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnomalyKind::NoArticlesIdentified => "no_articles_identified",
            AnomalyKind::DateUnparsed => "date_unparsed",
            AnomalyKind::MetadataFallback => "metadata_fallback",
            AnomalyKind::MissingHierarchy => "missing_hierarchy",
            AnomalyKind::ShortArticleBody => "short_article_body",
            AnomalyKind::DuplicatesRemoved => "duplicates_removed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub message: String,
    pub article_ordinal: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub strategy: Option<StrategyKind>,
    pub articles_found: usize,
    pub articles_kept: usize,
    pub duplicates_removed: usize,
    pub hierarchy_completeness_pct: f64,
    pub short_body_count: usize,
    pub confidence: f64,
    pub anomalies: Vec<Anomaly>,
    pub needs_review: bool,
}

impl QualityReport {
    pub fn has_warnings(&self) -> bool {
        self.anomalies
            .iter()
            .any(|anomaly| anomaly.severity >= Severity::Warning)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub source_url: String,
    pub content_hash: String,
    pub metadata: ActMetadata,
    pub articles: Vec<Article>,
    pub quality: QualityReport,
}

impl ParseResult {
    /// A document with a recognizable header but no articles is rejected
    /// rather than stored as an empty act.
    pub fn is_failure(&self) -> bool {
        self.articles.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunPaths {
    pub cache_root: String,
    pub output_dir: String,
    pub manifest_path: String,
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunCounts {
    pub documents_total: usize,
    pub documents_succeeded: usize,
    pub documents_failed: usize,
    pub documents_with_warnings: usize,
    pub acts_created: usize,
    pub acts_updated: usize,
    pub acts_unchanged: usize,
    pub articles_written: usize,
    pub duplicates_removed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    pub source_url: String,
    pub act: String,
    pub strategy: Option<StrategyKind>,
    pub articles: usize,
    pub confidence: f64,
    pub needs_review: bool,
    pub anomalies: Vec<String>,
    pub artifacts: Vec<String>,
    pub store_outcome: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub source_url: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub paths: RunPaths,
    pub counts: RunCounts,
    pub documents: Vec<DocumentReport>,
    pub failures: Vec<DocumentFailure>,
    pub warnings: Vec<String>,
}

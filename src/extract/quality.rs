use super::*;

pub(crate) const CSS_STRATEGY_BASE: f64 = 0.95;
pub(crate) const TEXT_STRATEGY_BASE: f64 = 0.70;
const WARNING_PENALTY: f64 = 0.05;
const MAX_WARNING_PENALTY: f64 = 0.30;
const HIERARCHY_GAP_WEIGHT: f64 = 0.10;
const SHORT_BODY_WEIGHT: f64 = 0.10;
pub(crate) const MIN_ARTICLE_BODY_CHARS: usize = 10;
pub(crate) const REVIEW_CONFIDENCE_THRESHOLD: f64 = 0.60;

fn strategy_base(strategy: StrategyKind) -> f64 {
    match strategy {
        StrategyKind::Css => CSS_STRATEGY_BASE,
        StrategyKind::Text => TEXT_STRATEGY_BASE,
    }
}

pub(crate) fn assess_quality(
    strategy: StrategyKind,
    articles_found: usize,
    articles: &[Article],
    duplicates_removed: usize,
    mut anomalies: Vec<Anomaly>,
) -> QualityReport {
    let total = articles.len();

    let with_context = articles
        .iter()
        .filter(|article| !article.hierarchy.is_empty())
        .count();
    let has_hierarchy = with_context > 0;
    let completeness = if total == 0 || !has_hierarchy {
        1.0
    } else {
        with_context as f64 / total as f64
    };

    if has_hierarchy && with_context < total {
        anomalies.push(Anomaly {
            kind: AnomalyKind::MissingHierarchy,
            severity: Severity::Warning,
            message: format!(
                "{} of {} articles have no title/chapter/section context",
                total - with_context,
                total
            ),
            article_ordinal: articles
                .iter()
                .find(|article| article.hierarchy.is_empty())
                .map(|article| article.ordinal),
        });
    }

    let mut short_body_count = 0usize;
    for article in articles {
        let body_chars = normalize_whitespace(&article.text).chars().count();
        if body_chars < MIN_ARTICLE_BODY_CHARS {
            short_body_count += 1;
            anomalies.push(Anomaly {
                kind: AnomalyKind::ShortArticleBody,
                severity: Severity::Warning,
                message: format!(
                    "{} has {} characters of text",
                    article.label, body_chars
                ),
                article_ordinal: Some(article.ordinal),
            });
        }
    }

    if duplicates_removed > 0 {
        anomalies.push(Anomaly {
            kind: AnomalyKind::DuplicatesRemoved,
            severity: Severity::Warning,
            message: format!("{duplicates_removed} duplicate articles removed"),
            article_ordinal: None,
        });
    }

    let warning_count = anomalies
        .iter()
        .filter(|anomaly| anomaly.severity >= Severity::Warning)
        .count();
    let short_ratio = if total == 0 {
        0.0
    } else {
        short_body_count as f64 / total as f64
    };

    let penalty = (warning_count as f64 * WARNING_PENALTY).min(MAX_WARNING_PENALTY)
        + HIERARCHY_GAP_WEIGHT * (1.0 - completeness)
        + SHORT_BODY_WEIGHT * short_ratio;
    let confidence = round_thousandths((strategy_base(strategy) - penalty).clamp(0.0, 1.0));

    QualityReport {
        strategy: Some(strategy),
        articles_found,
        articles_kept: total,
        duplicates_removed,
        hierarchy_completeness_pct: round_thousandths(completeness * 100.0),
        short_body_count,
        confidence,
        needs_review: warning_count > 0 || confidence < REVIEW_CONFIDENCE_THRESHOLD,
        anomalies,
    }
}

/// Report for a document where no strategy identified a single article.
pub(crate) fn failed_quality(mut anomalies: Vec<Anomaly>) -> QualityReport {
    anomalies.push(Anomaly {
        kind: AnomalyKind::NoArticlesIdentified,
        severity: Severity::Error,
        message: "no articles identified by any extraction strategy".to_string(),
        article_ordinal: None,
    });

    QualityReport {
        strategy: None,
        articles_found: 0,
        articles_kept: 0,
        duplicates_removed: 0,
        hierarchy_completeness_pct: 0.0,
        short_body_count: 0,
        confidence: 0.0,
        anomalies,
        needs_review: true,
    }
}

fn round_thousandths(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

use chrono::NaiveDate;

use super::*;
use crate::model::{
    Anomaly, AnomalyKind, HierarchyContext, QualityReport, Severity, StrategyKind,
};

fn sample_result(content_hash: &str, texts: &[&str]) -> ParseResult {
    let hierarchy = HierarchyContext {
        title: Some(HierarchyLevel {
            nr: Some(1),
            denumire: "TITLUL I - Dispoziții generale".to_string(),
        }),
        ..HierarchyContext::default()
    };

    ParseResult {
        source_url: "https://legislatie.just.ro/Public/DetaliiDocument/281585".to_string(),
        content_hash: content_hash.to_string(),
        metadata: ActMetadata {
            act_type: "LEGE".to_string(),
            act_number: "121".to_string(),
            act_date: NaiveDate::from_ymd_opt(2024, 4, 30),
            year: Some(2024),
            title: "LEGE nr. 121 din 30 aprilie 2024".to_string(),
            issuing_authority: None,
            gazette_number: None,
            gazette_date: None,
        },
        articles: texts
            .iter()
            .enumerate()
            .map(|(index, text)| Article {
                ordinal: index as u32 + 1,
                number: (index + 1).to_string(),
                label: format!("Articolul {}", index + 1),
                text: text.to_string(),
                hierarchy: hierarchy.clone(),
            })
            .collect(),
        quality: QualityReport {
            strategy: Some(StrategyKind::Css),
            articles_found: texts.len(),
            articles_kept: texts.len(),
            duplicates_removed: 0,
            hierarchy_completeness_pct: 100.0,
            short_body_count: 0,
            confidence: 0.95,
            anomalies: Vec::new(),
            needs_review: false,
        },
    }
}

#[test]
fn first_import_creates_act_with_version_one() {
    let mut store = ArticleStore::open_in_memory().expect("store");
    let result = sample_result("hash-a", &["Primul articol.", "Al doilea articol."]);

    let outcome = store.upsert_act(&result).expect("upsert");

    assert_eq!(outcome.status, UpsertStatus::Created);
    assert_eq!(outcome.version, 1);
    assert_eq!(outcome.articles_written, 2);
    let counts = store.counts().expect("counts");
    assert_eq!(counts.acts, 1);
    assert_eq!(counts.articles, 2);
}

#[test]
fn rescrape_with_same_hash_is_unchanged() {
    let mut store = ArticleStore::open_in_memory().expect("store");
    let result = sample_result("hash-a", &["Primul articol.", "Al doilea articol."]);

    let created = store.upsert_act(&result).expect("first upsert");
    let again = store.upsert_act(&result).expect("second upsert");

    assert_eq!(again.status, UpsertStatus::Unchanged);
    assert_eq!(again.act_id, created.act_id);
    assert_eq!(again.version, 1);
    assert_eq!(store.counts().expect("counts").articles, 2);
}

#[test]
fn changed_hash_bumps_version_and_replaces_articles() {
    let mut store = ArticleStore::open_in_memory().expect("store");
    let first = sample_result("hash-a", &["Primul articol.", "Al doilea articol."]);
    let created = store.upsert_act(&first).expect("first upsert");

    let mut second = sample_result(
        "hash-b",
        &["Primul articol modificat.", "Al doilea articol.", "Articol nou adăugat."],
    );
    second.source_url = "https://legislatie.just.ro/Public/DetaliiDocumentAfis/281585".to_string();
    let updated = store.upsert_act(&second).expect("second upsert");

    assert_eq!(updated.status, UpsertStatus::Updated);
    assert_eq!(updated.act_id, created.act_id);
    assert_eq!(updated.version, 2);
    assert_eq!(updated.articles_written, 3);

    let texts = store.article_texts(updated.act_id).expect("texts");
    assert_eq!(
        texts,
        vec![
            (1, "Primul articol modificat.".to_string()),
            (2, "Al doilea articol.".to_string()),
            (3, "Articol nou adăugat.".to_string()),
        ]
    );
    assert_eq!(store.counts().expect("counts").acts, 1);
}

#[test]
fn source_url_matches_when_identity_changes() {
    let mut store = ArticleStore::open_in_memory().expect("store");
    let first = sample_result("hash-a", &["Primul articol."]);
    let created = store.upsert_act(&first).expect("first upsert");

    let mut corrected = sample_result("hash-b", &["Primul articol."]);
    corrected.metadata.year = None;
    let updated = store.upsert_act(&corrected).expect("second upsert");

    assert_eq!(updated.act_id, created.act_id);
    assert_eq!(updated.status, UpsertStatus::Updated);
}

#[test]
fn delete_act_cascades_to_articles_and_anomalies() {
    let mut store = ArticleStore::open_in_memory().expect("store");
    let mut result = sample_result("hash-a", &["Primul articol.", "Abrogat."]);
    result.quality.anomalies.push(Anomaly {
        kind: AnomalyKind::ShortArticleBody,
        severity: Severity::Warning,
        message: "Articolul 2 has 8 characters of text".to_string(),
        article_ordinal: Some(2),
    });
    result.quality.needs_review = true;
    store.upsert_act(&result).expect("upsert");

    let deleted = store
        .delete_act(&ActSelector::Identity {
            act_type: "LEGE".to_string(),
            act_number: "121".to_string(),
            year: Some(2024),
        })
        .expect("delete");

    assert_eq!(deleted, 1);
    let counts = store.counts().expect("counts");
    assert_eq!(counts.acts, 0);
    assert_eq!(counts.articles, 0);
    assert_eq!(
        store
            .row_count("SELECT COUNT(*) FROM act_anomalies")
            .expect("anomaly count"),
        0
    );
}

#[test]
fn delete_by_unknown_source_url_removes_nothing() {
    let mut store = ArticleStore::open_in_memory().expect("store");
    store
        .upsert_act(&sample_result("hash-a", &["Primul articol."]))
        .expect("upsert");

    let deleted = store
        .delete_act(&ActSelector::SourceUrl("https://example.invalid/act".to_string()))
        .expect("delete");

    assert_eq!(deleted, 0);
    assert_eq!(store.counts().expect("counts").acts, 1);
}

#[test]
fn review_lists_flagged_acts_with_anomalies() {
    let mut store = ArticleStore::open_in_memory().expect("store");
    store
        .upsert_act(&sample_result("hash-a", &["Primul articol complet."]))
        .expect("clean upsert");

    let mut flagged = sample_result("hash-b", &["Abrogat."]);
    flagged.metadata.act_number = "7".to_string();
    flagged.source_url = "https://legislatie.just.ro/Public/DetaliiDocument/100".to_string();
    flagged.quality.confidence = 0.85;
    flagged.quality.needs_review = true;
    flagged.quality.anomalies.push(Anomaly {
        kind: AnomalyKind::ShortArticleBody,
        severity: Severity::Warning,
        message: "Articolul 1 has 8 characters of text".to_string(),
        article_ordinal: Some(1),
    });
    store.upsert_act(&flagged).expect("flagged upsert");

    let entries = store.acts_needing_review(50).expect("review");

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].act_number, "7");
    assert_eq!(entries[0].articles, 1);
    assert_eq!(entries[0].strategy.as_deref(), Some("css"));
    assert_eq!(
        entries[0].anomalies,
        vec!["[warning] short_article_body: Articolul 1 has 8 characters of text".to_string()]
    );
    assert_eq!(store.counts().expect("counts").acts_needing_review, 1);
}

#[test]
fn failures_are_recorded() {
    let store = ArticleStore::open_in_memory().expect("store");

    store
        .record_failure(
            "https://legislatie.just.ro/Public/DetaliiDocument/1",
            "no articles identified",
            Some("run-20240101T000000Z"),
        )
        .expect("record");

    assert_eq!(store.counts().expect("counts").scrape_failures, 1);
}

#[test]
fn store_file_is_created_on_open() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("legiscrape.sqlite");

    let store = ArticleStore::open(&path).expect("open store");

    assert!(path.exists());
    assert_eq!(store.counts().expect("counts"), StoreCounts::default());
}

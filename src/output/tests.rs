use chrono::NaiveDate;

use super::*;
use crate::model::{Anomaly, AnomalyKind, Severity, StrategyKind};

fn level(nr: u32, denumire: &str) -> Option<HierarchyLevel> {
    Some(HierarchyLevel {
        nr: Some(nr),
        denumire: denumire.to_string(),
    })
}

fn article(ordinal: u32, number: &str, text: &str, hierarchy: HierarchyContext) -> Article {
    Article {
        ordinal,
        number: number.to_string(),
        label: format!("Articolul {number}"),
        text: text.to_string(),
        hierarchy,
    }
}

fn sample_result() -> ParseResult {
    let title_one = HierarchyContext {
        title: level(1, "TITLUL I - Dispoziții generale"),
        ..HierarchyContext::default()
    };
    let chapter_one = HierarchyContext {
        chapter: level(1, "CAPITOLUL 1 - Definiții"),
        ..title_one.clone()
    };
    let section_one = HierarchyContext {
        section: level(1, "SECȚIUNEA 1"),
        ..chapter_one.clone()
    };
    let chapter_two = HierarchyContext {
        chapter: level(2, "CAPITOLUL 2"),
        ..title_one.clone()
    };

    ParseResult {
        source_url: "https://legislatie.just.ro/Public/DetaliiDocument/281585".to_string(),
        content_hash: "abc123".to_string(),
        metadata: ActMetadata {
            act_type: "LEGE".to_string(),
            act_number: "121".to_string(),
            act_date: NaiveDate::from_ymd_opt(2024, 4, 30),
            year: Some(2024),
            title: "LEGE nr. 121 din 30 aprilie 2024 privind eficiența energetică".to_string(),
            issuing_authority: Some("PARLAMENTUL ROMÂNIEI".to_string()),
            gazette_number: Some("409".to_string()),
            gazette_date: NaiveDate::from_ymd_opt(2024, 5, 3),
        },
        articles: vec![
            article(1, "1", "Prezenta lege stabilește cadrul general.", title_one),
            article(
                2,
                "2",
                "În sensul prezentei legi, termenii \"act\", \"articol\" au înțelesul:\na) act normativ;",
                chapter_one.clone(),
            ),
            article(3, "3", "Definiții suplimentare pentru secțiune.", section_one),
            article(4, "4", "Text din capitolul al doilea.", chapter_two),
        ],
        quality: QualityReport {
            strategy: Some(StrategyKind::Css),
            articles_found: 4,
            articles_kept: 4,
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
fn artifact_stem_uses_type_number_and_year() {
    let mut result = sample_result();
    assert_eq!(artifact_stem(&result.metadata), "lege_121_2024");

    result.metadata.act_type = "ORDONANȚĂ DE URGENȚĂ".to_string();
    result.metadata.year = None;
    assert_eq!(
        artifact_stem(&result.metadata),
        "ordonanta_de_urgenta_121_na"
    );
}

#[test]
fn csv_has_fixed_header_and_one_row_per_article() {
    let csv = render_csv(&sample_result());
    let first_line = csv.lines().next().expect("header line");

    assert_eq!(first_line, csv::CSV_HEADER.join(","));
    assert!(csv.ends_with('\n'));

    let fourth_row = csv.lines().last().expect("last row");
    assert_eq!(
        fourth_row,
        "LEGE,121,2024,LEGE nr. 121 din 30 aprilie 2024 privind eficiența energetică,4,Articolul 4,Text din capitolul al doilea.,1,TITLUL I - Dispoziții generale,2,CAPITOLUL 2,,,,"
    );
}

#[test]
fn csv_quotes_cells_with_separators_quotes_and_newlines() {
    assert_eq!(csv::escape_csv_cell("simplu"), "simplu");
    assert_eq!(csv::escape_csv_cell("a, b"), "\"a, b\"");
    assert_eq!(csv::escape_csv_cell("zis \"x\""), "\"zis \"\"x\"\"\"");
    assert_eq!(csv::escape_csv_cell("rând\nnou"), "\"rând\nnou\"");

    let csv = render_csv(&sample_result());
    assert!(csv.contains(
        "\"În sensul prezentei legi, termenii \"\"act\"\", \"\"articol\"\" au înțelesul:\na) act normativ;\""
    ));
}

#[test]
fn json_groups_consecutive_articles_under_shared_nodes() {
    let rendered = render_json(&sample_result()).expect("render json");
    let value: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");

    assert_eq!(value["act"]["act_type"], "LEGE");
    assert_eq!(value["act"]["act_date"], "2024-04-30");
    assert_eq!(value["act"]["content_hash"], "abc123");
    assert_eq!(value["quality"]["confidence"], 0.95);

    let structure = &value["structure"];
    assert_eq!(structure["articles"].as_array().map(Vec::len), Some(0));

    let titles = structure["children"].as_array().expect("title nodes");
    assert_eq!(titles.len(), 1);
    let title = &titles[0];
    assert_eq!(title["level"], "title");
    assert_eq!(title["nr"], 1);
    assert_eq!(title["articles"][0]["number"], "1");

    let chapters = title["children"].as_array().expect("chapter nodes");
    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[0]["denumire"], "CAPITOLUL 1 - Definiții");
    assert_eq!(chapters[0]["articles"][0]["ordinal"], 2);
    assert_eq!(chapters[0]["children"][0]["level"], "section");
    assert_eq!(chapters[0]["children"][0]["articles"][0]["number"], "3");
    assert_eq!(chapters[1]["nr"], 2);
    assert_eq!(chapters[1]["articles"][0]["number"], "4");
    assert_eq!(
        chapters[1]["children"].as_array().map(Vec::len),
        Some(0)
    );
}

#[test]
fn json_keeps_contextless_articles_at_the_root() {
    let mut result = sample_result();
    for article in &mut result.articles {
        article.hierarchy = HierarchyContext::default();
    }

    let rendered = render_json(&result).expect("render json");
    let value: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");

    assert_eq!(
        value["structure"]["articles"].as_array().map(Vec::len),
        Some(4)
    );
    assert_eq!(
        value["structure"]["children"].as_array().map(Vec::len),
        Some(0)
    );
}

#[test]
fn markdown_emits_headers_only_on_transitions() {
    let markdown = render_markdown(&sample_result());

    assert!(markdown.starts_with(
        "# LEGE nr. 121 din 30 aprilie 2024 privind eficiența energetică\n"
    ));
    assert!(markdown.contains("- Emitent: PARLAMENTUL ROMÂNIEI"));
    assert!(markdown.contains("- Monitorul Oficial: nr. 409 din 03.05.2024"));
    assert_eq!(markdown.matches("## TITLUL I").count(), 1);
    assert_eq!(markdown.matches("### CAPITOLUL 1 - Definiții").count(), 1);
    assert_eq!(markdown.matches("### CAPITOLUL 2").count(), 1);
    assert_eq!(markdown.matches("**SECȚIUNEA 1**").count(), 1);
    assert_eq!(markdown.matches("#### Articolul").count(), 4);

    let chapter_two = markdown.find("### CAPITOLUL 2").expect("chapter 2 header");
    let article_four = markdown.find("#### Articolul 4").expect("article 4 header");
    let article_three = markdown.find("#### Articolul 3").expect("article 3 header");
    assert!(article_three < chapter_two);
    assert!(chapter_two < article_four);
}

#[test]
fn markdown_repeats_lower_levels_under_a_new_parent() {
    let mut result = sample_result();
    let same_chapter = level(1, "CAPITOLUL I");
    result.articles.truncate(2);
    result.articles[0].hierarchy = HierarchyContext {
        title: level(1, "TITLUL I"),
        chapter: same_chapter.clone(),
        ..HierarchyContext::default()
    };
    result.articles[1].hierarchy = HierarchyContext {
        title: level(2, "TITLUL II"),
        chapter: same_chapter,
        ..HierarchyContext::default()
    };

    let markdown = render_markdown(&result);

    assert_eq!(markdown.matches("### CAPITOLUL I").count(), 2);
}

#[test]
fn write_artifacts_writes_each_requested_format_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = sample_result();

    let written = write_artifacts(
        dir.path(),
        &result,
        &[
            ArtifactFormat::Csv,
            ArtifactFormat::Json,
            ArtifactFormat::Markdown,
            ArtifactFormat::Csv,
        ],
    )
    .expect("write artifacts");

    assert_eq!(
        written,
        vec![
            dir.path().join("lege_121_2024.csv"),
            dir.path().join("lege_121_2024.json"),
            dir.path().join("lege_121_2024.md"),
        ]
    );
    let csv = std::fs::read_to_string(&written[0]).expect("read csv");
    assert_eq!(csv, render_csv(&result));
}

#[test]
fn quality_anomalies_are_part_of_the_json_artifact() {
    let mut result = sample_result();
    result.quality.anomalies.push(Anomaly {
        kind: AnomalyKind::ShortArticleBody,
        severity: Severity::Warning,
        message: "Articolul 4 has 8 characters of text".to_string(),
        article_ordinal: Some(4),
    });
    result.quality.needs_review = true;

    let rendered = render_json(&result).expect("render json");
    let value: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");

    assert_eq!(value["quality"]["needs_review"], true);
    assert_eq!(
        value["quality"]["anomalies"][0]["kind"],
        "short_article_body"
    );
    assert_eq!(value["quality"]["anomalies"][0]["severity"], "warning");
}

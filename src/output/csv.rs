use super::*;

pub(crate) const CSV_HEADER: [&str; 15] = [
    "tip_act",
    "nr_act",
    "data_an",
    "denumire",
    "Art.N",
    "Articol_Label",
    "Text_Articol",
    "Titlu_Nr",
    "Titlu_Denumire",
    "Capitol_Nr",
    "Capitol_Denumire",
    "Sectiune_Nr",
    "Sectiune_Denumire",
    "Subsectiune_Nr",
    "Subsectiune_Denumire",
];

/// One row per article with the hierarchy denormalized into column pairs.
pub fn render_csv(result: &ParseResult) -> String {
    let mut rows = Vec::<Vec<String>>::with_capacity(result.articles.len() + 1);
    rows.push(CSV_HEADER.iter().map(|cell| cell.to_string()).collect());

    for article in &result.articles {
        rows.push(article_row(&result.metadata, article));
    }

    let mut out = table_to_csv(&rows);
    out.push('\n');
    out
}

fn article_row(metadata: &ActMetadata, article: &Article) -> Vec<String> {
    let mut row = vec![
        metadata.act_type.clone(),
        metadata.act_number.clone(),
        metadata.year.map(|year| year.to_string()).unwrap_or_default(),
        metadata.title.clone(),
        article.number.clone(),
        article.label.clone(),
        article.text.clone(),
    ];

    for level in StructuralLevel::ALL {
        let (nr, denumire) = level_cells(article.hierarchy.slot(level));
        row.push(nr);
        row.push(denumire);
    }

    row
}

pub(crate) fn table_to_csv(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|cell| escape_csv_cell(cell))
                .collect::<Vec<String>>()
                .join(",")
        })
        .collect::<Vec<String>>()
        .join("\n")
}

pub(crate) fn escape_csv_cell(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

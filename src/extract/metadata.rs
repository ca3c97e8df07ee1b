use super::*;

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y", "%Y-%m-%d"];

const ROMANIAN_MONTHS: [&str; 12] = [
    "ianuarie",
    "februarie",
    "martie",
    "aprilie",
    "mai",
    "iunie",
    "iulie",
    "august",
    "septembrie",
    "octombrie",
    "noiembrie",
    "decembrie",
];

const MAX_ACT_TYPE_CHARS: usize = 60;

// Gazette lines share the "<words> nr. X din DATE" shape.
const NON_ACT_PREFIXES: &[&str] = &["MONITORUL", "PUBLICAT"];

#[derive(Debug)]
struct Denomination {
    act_type: String,
    act_number: String,
    date_text: Option<String>,
    number_year: Option<i32>,
    title: String,
}

pub(crate) fn extract_metadata(
    document: &SourceDocument,
    patterns: &MarkerPatterns,
    source_url: &str,
) -> Result<(ActMetadata, Vec<Anomaly>), ExtractError> {
    let mut anomalies = Vec::<Anomaly>::new();

    let from_marker = document
        .first_element_text(patterns, MarkerKind::Denomination)
        .and_then(|text| parse_denomination(&text, patterns));

    let denomination = match from_marker {
        Some(denomination) => denomination,
        None => {
            let denomination = document
                .header_lines()
                .iter()
                .find_map(|line| parse_denomination(line, patterns))
                .ok_or_else(|| ExtractError::MissingActIdentity {
                    source_url: source_url.to_string(),
                })?;
            anomalies.push(Anomaly {
                kind: AnomalyKind::MetadataFallback,
                severity: Severity::Info,
                message: "act denomination found by header text scan".to_string(),
                article_ordinal: None,
            });
            denomination
        }
    };

    let act_date = denomination.date_text.as_deref().and_then(parse_romanian_date);
    let year = act_date
        .map(|date| date.year())
        .or(denomination.number_year)
        .or_else(|| first_plausible_year(&denomination.title, patterns));

    if act_date.is_none() && (denomination.date_text.is_some() || year.is_none()) {
        anomalies.push(Anomaly {
            kind: AnomalyKind::DateUnparsed,
            severity: Severity::Warning,
            message: format!(
                "act date not recognized in '{}'",
                denomination.date_text.as_deref().unwrap_or(&denomination.title)
            ),
            article_ordinal: None,
        });
    }

    let (gazette_number, gazette_date) = extract_gazette(document, patterns);
    let issuing_authority = extract_issuer(document, patterns);

    let metadata = ActMetadata {
        act_type: denomination.act_type,
        act_number: denomination.act_number,
        act_date,
        year,
        title: denomination.title,
        issuing_authority,
        gazette_number,
        gazette_date,
    };

    Ok((metadata, anomalies))
}

fn parse_denomination(text: &str, patterns: &MarkerPatterns) -> Option<Denomination> {
    let text = normalize_whitespace(&normalize_diacritics(text));
    let captures = patterns.denomination.captures(&text)?;

    let act_type = captures.name("act_type")?.as_str().trim().to_uppercase();
    if act_type.is_empty()
        || act_type.chars().count() > MAX_ACT_TYPE_CHARS
        || NON_ACT_PREFIXES.iter().any(|word| act_type.contains(word))
    {
        return None;
    }

    let act_number = captures.name("number")?.as_str().to_string();
    let number_year = captures
        .name("number_year")
        .and_then(|m| m.as_str().parse::<i32>().ok());
    let date_text = captures.name("date").map(|m| m.as_str().to_string());

    Some(Denomination {
        act_type: normalize_whitespace(&act_type),
        act_number,
        date_text,
        number_year,
        title: text.clone(),
    })
}

/// Tries the numeric formats in priority order, then `30 aprilie 2024`.
pub(crate) fn parse_romanian_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    let tokens = text.split_whitespace().collect::<Vec<&str>>();
    let [day, month, year] = tokens.as_slice() else {
        return None;
    };

    let month_name = month.to_lowercase();
    let month = ROMANIAN_MONTHS
        .iter()
        .position(|name| *name == month_name)? as u32
        + 1;
    let day = day.parse::<u32>().ok()?;
    let year = year.parse::<i32>().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

fn first_plausible_year(text: &str, patterns: &MarkerPatterns) -> Option<i32> {
    patterns
        .plausible_year
        .captures(text)
        .and_then(|captures| captures.name("year"))
        .and_then(|m| m.as_str().parse::<i32>().ok())
}

fn extract_gazette(
    document: &SourceDocument,
    patterns: &MarkerPatterns,
) -> (Option<String>, Option<NaiveDate>) {
    let candidates = [
        document.first_element_text(patterns, MarkerKind::PublicationBody),
        document.first_element_text(patterns, MarkerKind::Publication),
    ];

    let from_markers = candidates
        .into_iter()
        .flatten()
        .find_map(|text| parse_gazette(&text, patterns));

    let parsed = from_markers.or_else(|| {
        document
            .header_lines()
            .iter()
            .find_map(|line| parse_gazette(line, patterns))
    });

    match parsed {
        Some((number, date)) => (Some(number), date),
        None => {
            debug!("gazette reference not found");
            (None, None)
        }
    }
}

fn parse_gazette(text: &str, patterns: &MarkerPatterns) -> Option<(String, Option<NaiveDate>)> {
    let captures = patterns.gazette.captures(text)?;
    let number = normalize_whitespace(captures.name("number")?.as_str());
    let date = captures
        .name("date")
        .and_then(|m| parse_romanian_date(m.as_str()));
    Some((number, date))
}

fn extract_issuer(document: &SourceDocument, patterns: &MarkerPatterns) -> Option<String> {
    if let Some(body) = document.first_element_text(patterns, MarkerKind::IssuerBody) {
        return Some(body);
    }

    if let Some(issuer) = document
        .first_element_text(patterns, MarkerKind::Issuer)
        .and_then(|text| issuer_from_line(&text, patterns))
    {
        return Some(issuer);
    }

    let lines = document.header_lines();
    for (index, line) in lines.iter().enumerate() {
        let Some(captures) = patterns.issuer_line.captures(line) else {
            continue;
        };
        let inline = captures
            .name("issuer")
            .map(|m| m.as_str().trim())
            .unwrap_or("");
        if !inline.is_empty() {
            return Some(inline.to_string());
        }
        return lines.get(index + 1).cloned();
    }

    None
}

fn issuer_from_line(text: &str, patterns: &MarkerPatterns) -> Option<String> {
    let issuer = match patterns.issuer_line.captures(text) {
        Some(captures) => captures.name("issuer")?.as_str().trim().to_string(),
        None => text.trim().to_string(),
    };
    (!issuer.is_empty()).then_some(issuer)
}

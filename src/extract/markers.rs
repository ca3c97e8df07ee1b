use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MarkerKind {
    Heading(StructuralLevel),
    HeadingName(StructuralLevel),
    ArticleTitle,
    ArticleBody,
    Denomination,
    Publication,
    PublicationBody,
    Issuer,
    IssuerBody,
}

/// CSS classes used by the portal's document rendering. Containers such as
/// `S_TTL` or `S_ART` are deliberately absent: their text spans the whole
/// subtree, only the leaf markers carry one piece of structure each.
pub(crate) const CSS_MARKERS: &[(&str, MarkerKind)] = &[
    ("S_TTL_TTL", MarkerKind::Heading(StructuralLevel::Title)),
    ("S_TTL_DEN", MarkerKind::HeadingName(StructuralLevel::Title)),
    ("S_CAP_TTL", MarkerKind::Heading(StructuralLevel::Chapter)),
    ("S_CAP_DEN", MarkerKind::HeadingName(StructuralLevel::Chapter)),
    ("S_SEC_TTL", MarkerKind::Heading(StructuralLevel::Section)),
    ("S_SEC_DEN", MarkerKind::HeadingName(StructuralLevel::Section)),
    ("S_SSEC_TTL", MarkerKind::Heading(StructuralLevel::Subsection)),
    ("S_SSEC_DEN", MarkerKind::HeadingName(StructuralLevel::Subsection)),
    ("S_ART_TTL", MarkerKind::ArticleTitle),
    ("S_ART_BDY", MarkerKind::ArticleBody),
    ("S_ALN", MarkerKind::ArticleBody),
    ("S_LIT", MarkerKind::ArticleBody),
    ("S_PCT", MarkerKind::ArticleBody),
    ("S_DEN", MarkerKind::Denomination),
    ("S_PUB", MarkerKind::Publication),
    ("S_PUB_BDY", MarkerKind::PublicationBody),
    ("S_EMT", MarkerKind::Issuer),
    ("S_EMT_BDY", MarkerKind::IssuerBody),
];

const NUMBER_TOKEN: &str = r"(?:a\s+)?(?:\d+|[IVXLCDM]+)(?:\s*\^\s*\d+)?(?:-a)?";
const ARTICLE_NUMBER_TOKEN: &str = r"\d+(?:\s*\^\s*\d+)?|unic|UNIC|[IVXLCDM]+";
const DATE_TOKEN: &str =
    r"\d{1,2}[./-]\d{1,2}[./-]\d{4}|\d{4}-\d{2}-\d{2}|\d{1,2}\s+\p{L}+\s+\d{4}";

#[derive(Debug)]
pub(crate) struct MarkerPatterns {
    pub(crate) article_title: Regex,
    pub(crate) article_line: Regex,
    pub(crate) heading_line: Regex,
    pub(crate) heading_number: Regex,
    pub(crate) denomination: Regex,
    pub(crate) gazette: Regex,
    pub(crate) issuer_line: Regex,
    pub(crate) plausible_year: Regex,
}

impl MarkerPatterns {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            article_title: Regex::new(&format!(
                r"^\s*(?P<label>(?:Articolul|ARTICOLUL|Art\.|ART\.)\s*(?P<number>{ARTICLE_NUMBER_TOKEN}))\b"
            ))
            .context("failed to compile article title regex")?,
            article_line: Regex::new(&format!(
                r"^(?P<label>(?:Articolul|ARTICOLUL|Art\.|ART\.)\s*(?P<number>{ARTICLE_NUMBER_TOKEN}))(?:\s*(?:$|[.:]|[-–—])\s*[-–—]?\s*(?P<rest>.*)|\s+(?P<inline>[\p{{Lu}}(].*))$"
            ))
            .context("failed to compile article line regex")?,
            heading_line: Regex::new(&format!(
                r"(?i)^(?P<keyword>TITLUL|CAPITOLUL|SEC[ȚŢT]IUNEA|SUBSEC[ȚŢT]IUNEA)\s+(?P<number>{NUMBER_TOKEN})\b(?P<rest>.*)$"
            ))
            .context("failed to compile heading line regex")?,
            heading_number: Regex::new(&format!(
                r"(?i)^\s*(?:TITLUL|CAPITOLUL|SEC[ȚŢT]IUNEA|SUBSEC[ȚŢT]IUNEA)?\s*(?P<number>{NUMBER_TOKEN})\b"
            ))
            .context("failed to compile heading number regex")?,
            denomination: Regex::new(&format!(
                r"(?i)^\s*(?P<act_type>\p{{L}}[\p{{L}}\s]*?)\s+nr\.\s*(?P<number>\d+[A-Za-z]?)(?:\s*/\s*(?P<number_year>\d{{4}}))?(?:\s+din\s+(?P<date>{DATE_TOKEN}))?(?P<rest>.*)$"
            ))
            .context("failed to compile denomination regex")?,
            gazette: Regex::new(&format!(
                r"(?i)MONITORUL\s+OFICIAL\b.*?\bnr\.\s*(?P<number>\d+(?:\s*bis)?)(?:\s+din\s+(?P<date>{DATE_TOKEN}))?"
            ))
            .context("failed to compile gazette regex")?,
            issuer_line: Regex::new(r"(?i)^EMITENT(?:UL)?\b\s*:?\s*(?P<issuer>.*)$")
                .context("failed to compile issuer regex")?,
            plausible_year: Regex::new(r"\b(?P<year>(?:18|19|20)\d{2})\b")
                .context("failed to compile year regex")?,
        })
    }

    pub(crate) fn classify(&self, element: ElementRef<'_>) -> Option<MarkerKind> {
        let classes = element.value().classes().collect::<Vec<&str>>();
        CSS_MARKERS
            .iter()
            .find(|(class, _)| classes.contains(class))
            .map(|(_, kind)| *kind)
    }

    /// Splits an article heading into (number, label). The label keeps the
    /// display form; the number is normalized (`5 ^1` → `5^1`, `IV` → `4`).
    pub(crate) fn parse_article_title(&self, text: &str) -> Option<(String, String)> {
        let captures = self.article_title.captures(text)?;
        let label = captures.name("label")?.as_str().trim().to_string();
        let number = normalize_article_number(captures.name("number")?.as_str());
        Some((number, label))
    }

    pub(crate) fn parse_heading_number(&self, text: &str) -> Option<u32> {
        let captures = self.heading_number.captures(text)?;
        parse_structural_number(captures.name("number")?.as_str())
    }

    /// Recognizes a plain-text structural heading line. Lowercase keywords
    /// only count when nothing but a separator follows the number, so body
    /// sentences like "Capitolul 3 din lege se modifică" are not headings.
    pub(crate) fn match_heading_line(&self, line: &str) -> Option<StructuralLevel> {
        if line.chars().count() > 200 {
            return None;
        }

        let captures = self.heading_line.captures(line)?;
        let keyword = captures.name("keyword")?.as_str();
        let rest = captures.name("rest").map(|m| m.as_str().trim()).unwrap_or("");

        let keyword_upper = !keyword.chars().any(char::is_lowercase);
        let rest_is_separated = rest.is_empty() || rest.starts_with(['-', '–', '—', '.', ':']);
        if !keyword_upper && !rest_is_separated {
            return None;
        }

        let keyword = normalize_diacritics(keyword).to_uppercase();
        match keyword.as_str() {
            "TITLUL" => Some(StructuralLevel::Title),
            "CAPITOLUL" => Some(StructuralLevel::Chapter),
            "SUBSECȚIUNEA" | "SUBSECTIUNEA" => Some(StructuralLevel::Subsection),
            "SECȚIUNEA" | "SECTIUNEA" => Some(StructuralLevel::Section),
            _ => None,
        }
    }
}

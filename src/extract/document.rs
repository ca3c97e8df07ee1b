use super::*;

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "h1", "h2", "h3", "h4",
    "h5", "h6", "hr", "li", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

const SKIPPED_TEXT_PARENTS: &[&str] = &["head", "noscript", "script", "style", "title"];

/// One fetched document, parsed once and viewed both as markup (for the
/// CSS strategy) and as text lines (for the fallback strategy and header scan).
pub(crate) struct SourceDocument {
    pub(crate) html: Html,
    pub(crate) lines: Vec<String>,
}

impl SourceDocument {
    pub(crate) fn new(content: &str) -> Self {
        let html = Html::parse_document(content);
        let lines = if looks_like_markup(content) {
            markup_lines(&html)
        } else {
            plain_lines(content)
        };

        Self { html, lines }
    }

    pub(crate) fn first_element_text(
        &self,
        patterns: &MarkerPatterns,
        kind: MarkerKind,
    ) -> Option<String> {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|element| patterns.classify(*element) == Some(kind))
            .map(element_text)
            .filter(|text| !text.is_empty())
    }

    pub(crate) fn header_lines(&self) -> &[String] {
        let end = self.lines.len().min(HEADER_SCAN_LINES);
        &self.lines[..end]
    }
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    normalize_diacritics(&normalize_whitespace(
        &element.text().collect::<Vec<&str>>().join(" "),
    ))
}

fn looks_like_markup(content: &str) -> bool {
    let head = content.trim_start();
    head.starts_with('<') || content.contains("</")
}

fn plain_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| normalize_diacritics(&normalize_whitespace(line)))
        .filter(|line| !line.is_empty())
        .collect()
}

fn markup_lines(html: &Html) -> Vec<String> {
    let mut lines = Vec::<String>::new();
    let mut current = String::new();

    for node in html.tree.root().descendants() {
        match node.value() {
            Node::Element(element) => {
                if BLOCK_TAGS.contains(&element.name()) {
                    flush_line(&mut current, &mut lines);
                }
            }
            Node::Text(text) => {
                let skipped = node
                    .parent()
                    .and_then(|parent| parent.value().as_element())
                    .is_some_and(|parent| SKIPPED_TEXT_PARENTS.contains(&parent.name()));
                if skipped {
                    continue;
                }

                for (index, piece) in text.split('\n').enumerate() {
                    if index > 0 {
                        flush_line(&mut current, &mut lines);
                    }
                    current.push(' ');
                    current.push_str(piece);
                }
            }
            _ => {}
        }
    }

    flush_line(&mut current, &mut lines);
    lines
}

fn flush_line(current: &mut String, lines: &mut Vec<String>) {
    let line = normalize_diacritics(&normalize_whitespace(current));
    if !line.is_empty() {
        lines.push(line);
    }
    current.clear();
}

use super::*;

/// Walks elements in document order and classifies them by portal CSS class.
#[derive(Debug)]
pub(crate) struct CssMarkerStrategy;

impl ExtractionStrategy for CssMarkerStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Css
    }

    fn attempt(
        &self,
        document: &SourceDocument,
        patterns: &MarkerPatterns,
    ) -> Option<StrategyOutput> {
        let mut walker = StructureWalker::default();

        for element in document
            .html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
        {
            let Some(kind) = patterns.classify(element) else {
                continue;
            };

            match kind {
                MarkerKind::Heading(level) => {
                    let heading = element_text(element);
                    let nr = patterns.parse_heading_number(&heading);
                    walker.open_level(level, &heading, nr);
                }
                MarkerKind::HeadingName(level) => {
                    walker.name_level(level, &element_text(element));
                }
                MarkerKind::ArticleTitle => {
                    let heading = element_text(element);
                    if heading.is_empty() {
                        continue;
                    }
                    let (number, label) = patterns
                        .parse_article_title(&heading)
                        .unwrap_or_else(|| (fallback_article_number(&heading), heading.clone()));
                    walker.start_article(number, label);
                }
                MarkerKind::ArticleBody => {
                    if inside_article_body(element, patterns) {
                        continue;
                    }
                    walker.push_body(&element_text(element));
                }
                _ => {}
            }
        }

        non_empty_output(self.kind(), walker.finish())
    }
}

/// Body markers nest (`S_ALN` inside `S_ART_BDY`); only the outermost one is read.
fn inside_article_body(element: ElementRef<'_>, patterns: &MarkerPatterns) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| patterns.classify(ancestor) == Some(MarkerKind::ArticleBody))
}

fn fallback_article_number(heading: &str) -> String {
    let stripped = heading
        .trim_start_matches(|ch: char| ch.is_alphabetic() || ch == '.')
        .trim();
    if stripped.is_empty() {
        heading.to_string()
    } else {
        normalize_article_number(stripped.trim_end_matches(['.', ':', '-']))
    }
}

use super::*;

/// Line-oriented fallback for renderings without portal CSS classes.
#[derive(Debug)]
pub(crate) struct TextPatternStrategy;

impl ExtractionStrategy for TextPatternStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Text
    }

    fn attempt(
        &self,
        document: &SourceDocument,
        patterns: &MarkerPatterns,
    ) -> Option<StrategyOutput> {
        let mut walker = StructureWalker::default();

        for line in &document.lines {
            if let Some(level) = patterns.match_heading_line(line) {
                let nr = patterns.parse_heading_number(line);
                walker.open_level(level, line, nr);
                continue;
            }

            if let Some(captures) = patterns.article_line.captures(line) {
                let label = captures
                    .name("label")
                    .map(|m| m.as_str())
                    .unwrap_or(line.as_str());
                let number = captures
                    .name("number")
                    .map(|m| normalize_article_number(m.as_str()))
                    .unwrap_or_default();
                walker.start_article(number, label.to_string());
                // `Art. 1 Prezenta lege ...` carries its body on the heading line.
                if let Some(rest) = captures.name("rest").or_else(|| captures.name("inline")) {
                    walker.push_body(rest.as_str());
                }
                continue;
            }

            if walker.has_open_article() {
                walker.push_body(line);
            } else if let Some(level) = walker.take_pending_name() {
                walker.name_level(level, line);
            }
        }

        non_empty_output(self.kind(), walker.finish())
    }
}

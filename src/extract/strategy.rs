use super::*;

#[derive(Debug)]
pub(crate) struct StrategyOutput {
    pub(crate) strategy: StrategyKind,
    pub(crate) articles: Vec<Article>,
}

/// One way of recovering structure from a document. Returns `None` when the
/// document offers nothing this strategy recognizes, so the next one runs.
pub(crate) trait ExtractionStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn attempt(
        &self,
        document: &SourceDocument,
        patterns: &MarkerPatterns,
    ) -> Option<StrategyOutput>;
}

pub(crate) fn default_strategies() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![Box::new(CssMarkerStrategy), Box::new(TextPatternStrategy)]
}

pub(crate) fn non_empty_output(
    kind: StrategyKind,
    articles: Vec<Article>,
) -> Option<StrategyOutput> {
    (!articles.is_empty()).then_some(StrategyOutput {
        strategy: kind,
        articles,
    })
}

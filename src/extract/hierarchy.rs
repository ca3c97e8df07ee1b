use super::*;

impl HierarchyContext {
    pub fn slot(&self, level: StructuralLevel) -> Option<&HierarchyLevel> {
        match level {
            StructuralLevel::Title => self.title.as_ref(),
            StructuralLevel::Chapter => self.chapter.as_ref(),
            StructuralLevel::Section => self.section.as_ref(),
            StructuralLevel::Subsection => self.subsection.as_ref(),
        }
    }

    fn slot_mut(&mut self, level: StructuralLevel) -> &mut Option<HierarchyLevel> {
        match level {
            StructuralLevel::Title => &mut self.title,
            StructuralLevel::Chapter => &mut self.chapter,
            StructuralLevel::Section => &mut self.section,
            StructuralLevel::Subsection => &mut self.subsection,
        }
    }

    /// Opens `level` and closes every level nested below it.
    pub fn open(&mut self, level: StructuralLevel, node: HierarchyLevel) {
        *self.slot_mut(level) = Some(node);
        match level {
            StructuralLevel::Title => {
                self.chapter = None;
                self.section = None;
                self.subsection = None;
            }
            StructuralLevel::Chapter => {
                self.section = None;
                self.subsection = None;
            }
            StructuralLevel::Section => {
                self.subsection = None;
            }
            StructuralLevel::Subsection => {}
        }
    }

    /// Appends a heading name to the open node, e.g. `TITLUL I - Dispoziții generale`.
    /// Returns false when no node is open at that level.
    pub fn describe(&mut self, level: StructuralLevel, name: &str) -> bool {
        let name = name.trim();
        match self.slot_mut(level) {
            Some(node) if !name.is_empty() => {
                if node.denumire.is_empty() {
                    node.denumire = name.to_string();
                } else {
                    node.denumire = format!("{} - {}", node.denumire, name);
                }
                true
            }
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        StructuralLevel::ALL
            .iter()
            .all(|level| self.slot(*level).is_none())
    }
}

#[derive(Debug)]
struct OpenArticle {
    number: String,
    label: String,
    body: Vec<String>,
    hierarchy: HierarchyContext,
}

/// Forward-scan state shared by every strategy: the open hierarchy, the
/// article being accumulated and the next ordinal.
#[derive(Debug, Default)]
pub(crate) struct StructureWalker {
    context: HierarchyContext,
    open: Option<OpenArticle>,
    pending_name: Option<StructuralLevel>,
    articles: Vec<Article>,
}

impl StructureWalker {
    pub(crate) fn open_level(&mut self, level: StructuralLevel, heading: &str, nr: Option<u32>) {
        self.close_article();
        self.context.open(
            level,
            HierarchyLevel {
                nr,
                denumire: normalize_whitespace(heading),
            },
        );
        self.pending_name = Some(level);
    }

    pub(crate) fn name_level(&mut self, level: StructuralLevel, name: &str) {
        if !self.context.describe(level, &normalize_whitespace(name)) {
            debug!(level = ?level, name, "heading name without an open heading dropped");
        }
        self.pending_name = None;
    }

    /// Text mode: the first plain line after a heading names that heading.
    pub(crate) fn take_pending_name(&mut self) -> Option<StructuralLevel> {
        if self.open.is_some() {
            return None;
        }
        self.pending_name.take()
    }

    pub(crate) fn start_article(&mut self, number: String, label: String) {
        self.close_article();
        self.pending_name = None;
        self.open = Some(OpenArticle {
            number,
            label: normalize_whitespace(&label),
            body: Vec::new(),
            hierarchy: self.context.clone(),
        });
    }

    /// Text outside an open article is preamble or decoration and is dropped.
    pub(crate) fn push_body(&mut self, text: &str) {
        let Some(article) = self.open.as_mut() else {
            return;
        };

        let text = text.trim();
        if !text.is_empty() {
            article.body.push(text.to_string());
        }
    }

    pub(crate) fn has_open_article(&self) -> bool {
        self.open.is_some()
    }

    fn close_article(&mut self) {
        let Some(article) = self.open.take() else {
            return;
        };

        let ordinal = self.articles.len() as u32 + 1;
        self.articles.push(Article {
            ordinal,
            number: article.number,
            label: article.label,
            text: article.body.join("\n"),
            hierarchy: article.hierarchy,
        });
    }

    pub(crate) fn finish(mut self) -> Vec<Article> {
        self.close_article();
        self.articles
    }
}

use super::*;

#[derive(Debug, PartialEq, Eq, Hash)]
struct ArticleKey {
    number: String,
    hierarchy: HierarchyContext,
    body: String,
}

/// Drops later copies of an article already seen with the same number,
/// hierarchy and whitespace-normalized body, then renumbers ordinals 1..n.
pub(crate) fn deduplicate_articles(articles: Vec<Article>) -> (Vec<Article>, usize) {
    let mut seen = HashSet::<ArticleKey>::new();
    let mut kept = Vec::<Article>::with_capacity(articles.len());
    let mut removed = 0usize;

    for article in articles {
        let key = ArticleKey {
            number: article.number.clone(),
            hierarchy: article.hierarchy.clone(),
            body: normalize_whitespace(&article.text),
        };

        if !seen.insert(key) {
            debug!(
                number = %article.number,
                ordinal = article.ordinal,
                "dropping duplicate article"
            );
            removed += 1;
            continue;
        }

        kept.push(article);
    }

    for (index, article) in kept.iter_mut().enumerate() {
        article.ordinal = index as u32 + 1;
    }

    (kept, removed)
}

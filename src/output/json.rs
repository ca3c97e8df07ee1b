use super::*;

#[derive(Debug, Serialize)]
struct JsonAct<'a> {
    #[serde(flatten)]
    metadata: &'a ActMetadata,
    source_url: &'a str,
    content_hash: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonArticle<'a> {
    ordinal: u32,
    number: &'a str,
    label: &'a str,
    text: &'a str,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct JsonStructure<'a> {
    articles: Vec<JsonArticle<'a>>,
    children: Vec<JsonNode<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonNode<'a> {
    level: StructuralLevel,
    nr: Option<u32>,
    denumire: &'a str,
    #[serde(skip)]
    key: &'a HierarchyLevel,
    articles: Vec<JsonArticle<'a>>,
    children: Vec<JsonNode<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonDocument<'a> {
    act: JsonAct<'a>,
    quality: &'a QualityReport,
    structure: JsonStructure<'a>,
}

pub fn render_json(result: &ParseResult) -> Result<String> {
    let document = JsonDocument {
        act: JsonAct {
            metadata: &result.metadata,
            source_url: &result.source_url,
            content_hash: &result.content_hash,
        },
        quality: &result.quality,
        structure: build_structure(&result.articles),
    };

    let mut out =
        serde_json::to_string_pretty(&document).context("failed to serialize act json")?;
    out.push('\n');
    Ok(out)
}

/// Nests articles under their title/chapter/section/subsection. Consecutive
/// articles sharing an open node land in the same node; a node reopened
/// later in the document becomes a new sibling.
pub(crate) fn build_structure(articles: &[Article]) -> JsonStructure<'_> {
    let mut root = JsonStructure::default();

    for article in articles {
        let entry = JsonArticle {
            ordinal: article.ordinal,
            number: &article.number,
            label: &article.label,
            text: &article.text,
        };

        let path = context_path(&article.hierarchy);
        let Some((first, rest)) = path.split_first() else {
            root.articles.push(entry);
            continue;
        };

        let mut node = descend(&mut root.children, *first);
        for step in rest {
            node = descend(&mut node.children, *step);
        }
        node.articles.push(entry);
    }

    root
}

fn context_path(context: &HierarchyContext) -> Vec<(StructuralLevel, &HierarchyLevel)> {
    StructuralLevel::ALL
        .iter()
        .filter_map(|level| context.slot(*level).map(|node| (*level, node)))
        .collect()
}

fn descend<'a, 'n>(
    children: &'n mut Vec<JsonNode<'a>>,
    (level, key): (StructuralLevel, &'a HierarchyLevel),
) -> &'n mut JsonNode<'a> {
    let reuse_last = children
        .last()
        .is_some_and(|node| node.level == level && node.key == key);

    if !reuse_last {
        children.push(JsonNode {
            level,
            nr: key.nr,
            denumire: &key.denumire,
            key,
            articles: Vec::new(),
            children: Vec::new(),
        });
    }

    let index = children.len() - 1;
    &mut children[index]
}

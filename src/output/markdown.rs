use super::*;

pub fn render_markdown(result: &ParseResult) -> String {
    let metadata = &result.metadata;
    let mut lines = Vec::<String>::new();

    lines.push(format!("# {}", metadata.title));
    lines.push(String::new());
    lines.extend(metadata_lines(metadata, &result.source_url));

    let mut previous: Option<&HierarchyContext> = None;
    for article in &result.articles {
        lines.extend(transition_lines(previous, &article.hierarchy));
        lines.push(String::new());
        lines.push(format!("#### {}", article.label));
        lines.push(String::new());
        if !article.text.is_empty() {
            lines.extend(article.text.lines().map(|line| line.to_string()));
        }
        previous = Some(&article.hierarchy);
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn metadata_lines(metadata: &ActMetadata, source_url: &str) -> Vec<String> {
    let mut lines = vec![
        format!("- Tip act: {}", metadata.act_type),
        format!("- Număr: {}", metadata.act_number),
    ];
    if let Some(date) = metadata.act_date {
        lines.push(format!("- Data: {}", date.format("%d.%m.%Y")));
    } else if let Some(year) = metadata.year {
        lines.push(format!("- An: {year}"));
    }
    if let Some(issuer) = &metadata.issuing_authority {
        lines.push(format!("- Emitent: {issuer}"));
    }
    if let Some(gazette) = &metadata.gazette_number {
        match metadata.gazette_date {
            Some(date) => lines.push(format!(
                "- Monitorul Oficial: nr. {gazette} din {}",
                date.format("%d.%m.%Y")
            )),
            None => lines.push(format!("- Monitorul Oficial: nr. {gazette}")),
        }
    }
    lines.push(format!("- Sursa: {source_url}"));
    lines
}

/// Headers for every slot that differs from the previous article. Once a
/// level changes, all open levels below it are repeated as well, since
/// they now belong to a different parent.
fn transition_lines(
    previous: Option<&HierarchyContext>,
    current: &HierarchyContext,
) -> Vec<String> {
    let mut lines = Vec::<String>::new();
    let mut parent_changed = false;

    for level in StructuralLevel::ALL {
        let before = previous.and_then(|context| context.slot(level));
        let after = current.slot(level);
        if !parent_changed && before == after {
            continue;
        }
        parent_changed = true;

        if let Some(node) = after {
            lines.push(String::new());
            lines.push(heading_line(level, &node.denumire));
        }
    }

    lines
}

fn heading_line(level: StructuralLevel, denumire: &str) -> String {
    match level {
        StructuralLevel::Title => format!("## {denumire}"),
        StructuralLevel::Chapter => format!("### {denumire}"),
        StructuralLevel::Section => format!("**{denumire}**"),
        StructuralLevel::Subsection => format!("*{denumire}*"),
    }
}

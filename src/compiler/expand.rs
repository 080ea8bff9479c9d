//! Composite expansion: accordions are spliced into their parent as a
//! heading followed by their content, at any depth.

use crate::options::Options;
use crate::patterns::WHITESPACE_NORMALIZE;
use crate::tree::Node;

/// Expand every `detailsGroup` and `details` below and including `nodes`.
#[must_use]
pub fn expand_composites(nodes: Vec<Node>, options: &Options) -> Vec<Node> {
    nodes
        .into_iter()
        .flat_map(|node| match node {
            Node::DetailsGroup { content } => expand_composites(content, options),
            Node::Details { content } => expand_details(content, options),
            other => vec![other.map_content(|c| expand_composites(c, options))],
        })
        .collect()
}

fn expand_details(content: Vec<Node>, options: &Options) -> Vec<Node> {
    let mut summary = String::new();
    let mut body = Vec::new();

    for child in content {
        match child {
            Node::DetailsSummary { content } if summary.is_empty() => {
                let text = Node::paragraph(content).plain_text();
                summary = WHITESPACE_NORMALIZE.replace_all(&text, " ").trim().to_string();
            }
            Node::DetailsContent { content } => body.extend(expand_composites(content, options)),
            other => body.extend(expand_composites(vec![other], options)),
        }
    }

    let title = if summary.is_empty() {
        options.accordion_title_placeholder.clone()
    } else {
        summary
    };

    let mut out = vec![Node::heading(options.accordion_heading_level, title)];
    out.extend(body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(summary: &str, body: Vec<Node>) -> Node {
        Node::Details {
            content: vec![
                Node::DetailsSummary {
                    content: if summary.is_empty() { vec![] } else { vec![Node::plain(summary)] },
                },
                Node::DetailsContent { content: body },
            ],
        }
    }

    #[test]
    fn test_group_splices_headings_and_content() {
        let para = Node::paragraph(vec![Node::plain("Answer")]);
        let out = expand_composites(
            vec![Node::DetailsGroup {
                content: vec![details("Question", vec![para.clone()]), details("", vec![])],
            }],
            &Options::default(),
        );
        assert_eq!(
            out,
            vec![
                Node::heading(3, "Question"),
                para,
                Node::heading(3, "More information"),
            ]
        );
    }

    #[test]
    fn test_nested_details_inside_list_item() {
        let out = expand_composites(
            vec![Node::ListItem {
                content: vec![details("Q", vec![])],
            }],
            &Options::default(),
        );
        assert_eq!(out, vec![Node::ListItem { content: vec![Node::heading(3, "Q")] }]);
    }
}

use ego_tree::NodeRef;
use scraper::{ElementRef, Node};

use super::stripped_text;
use crate::model::SENTINEL;

const SECTION_TAG: &str = "div";
const LABEL_TAG: &str = "span";
const BREAK_TAG: &str = "br";

/// Text the source uses for a market that is not offered.
const NOT_OFFERED: &str = "-";

/// Trim `value` and map the "not offered" dash to [`SENTINEL`].
pub fn normalize_sentinel(value: &str) -> String {
    match value.trim() {
        NOT_OFFERED => SENTINEL.to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Look up one secondary market price in an expanded detail row.
///
/// Finds the `div` whose text is `section` (exact match first, then
/// substring), then the first `span` after it whose text is `label` (same
/// matching), and returns the node right after the next `<br>`. Any missing
/// step yields [`SENTINEL`].
pub fn extract_detail_value(detail_row: ElementRef, section: &str, label: &str) -> String {
    lookup(detail_row, section, label)
        .map(|value| normalize_sentinel(&value))
        .unwrap_or_else(|| SENTINEL.to_string())
}

fn lookup(detail_row: ElementRef, section: &str, label: &str) -> Option<String> {
    // Document order.
    let nodes: Vec<NodeRef<Node>> = detail_row.descendants().collect();

    let section_at = find_labelled(&nodes, SECTION_TAG, section)?;
    let after_section = &nodes[section_at + 1..];

    let label_at = find_labelled(after_section, LABEL_TAG, label)?;
    let after_label = &after_section[label_at + 1..];

    let line_break = after_label.iter().find(|node| is_tag(node, BREAK_TAG))?;
    let value = line_break.next_sibling()?;
    match value.value() {
        Node::Text(text) => Some(text.trim().to_string()),
        Node::Element(_) => ElementRef::wrap(value).map(stripped_text),
        _ => None,
    }
}

/// Index of the first `tag` element whose sole text equals `text`, or failing
/// that, contains it.
fn find_labelled(nodes: &[NodeRef<Node>], tag: &str, text: &str) -> Option<usize> {
    let wanted = text.trim();
    let candidates = || {
        nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| is_tag(node, tag))
            .filter_map(|(i, node)| sole_text(*node).map(|s| (i, s)))
    };

    candidates()
        .find(|(_, s)| s.trim() == wanted)
        .or_else(|| candidates().find(|(_, s)| s.contains(text)))
        .map(|(i, _)| i)
}

/// The text of a node that wraps a single string, possibly through a chain
/// of single-child elements.
fn sole_text<'a>(node: NodeRef<'a, Node>) -> Option<&'a str> {
    let mut children = node.children();
    let only = children.next()?;
    if children.next().is_some() {
        return None;
    }
    match only.value() {
        Node::Text(text) => Some(&**text),
        Node::Element(_) => sole_text(only),
        _ => None,
    }
}

fn is_tag(node: &NodeRef<Node>, tag: &str) -> bool {
    node.value()
        .as_element()
        .is_some_and(|element| element.name() == tag)
}

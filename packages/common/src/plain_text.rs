//! Plain-text export
//!
//! Hosting forms use this to decide whether a field is empty and to build
//! print views, so void content has to show up in the output: an image
//! contributes its asset key and a table a fixed marker.

use folio_model::{Element, ElementType, Leaf, Node};

use crate::visitor::{walk_element, Visitor};

/// Stand-in text for a table
pub const TABLE_MARKER: &str = "[table]";

struct PlainText {
    out: String,
}

impl PlainText {
    fn push_blocks<'ast>(&mut self, children: &'ast [Node]) {
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            self.visit_node(child);
        }
    }
}

impl<'ast> Visitor<'ast> for PlainText {
    fn visit_element(&mut self, element: &'ast Element) {
        match element.kind {
            ElementType::Image => self.out.push_str(element.object_key().unwrap_or_default()),
            ElementType::Table => self.out.push_str(TABLE_MARKER),
            ElementType::Equation | ElementType::InlineEquation => {
                self.out.push_str(element.latex().unwrap_or_default())
            }
            ElementType::Reference => self.out.push_str(element.ref_id().unwrap_or_default()),
            _ if has_block_children(element) => self.push_blocks(&element.children),
            _ => walk_element(self, element),
        }
    }

    fn visit_leaf(&mut self, leaf: &'ast Leaf) {
        self.out.push_str(&leaf.text);
    }
}

fn has_block_children(element: &Element) -> bool {
    element.children.iter().any(|child| !child.is_inline())
}

/// Plain text of one node. Sibling blocks are separated by newlines.
pub fn serialize_to_plain_text(node: &Node) -> String {
    let mut visitor = PlainText { out: String::new() };
    visitor.visit_node(node);
    visitor.out
}

/// Plain text of a node list, one line per top-level block
pub fn serialize_nodes_to_plain_text(nodes: &[Node]) -> String {
    let mut visitor = PlainText { out: String::new() };
    visitor.push_blocks(nodes);
    visitor.out
}

/// Whether a field holds nothing but whitespace once exported
pub fn is_blank(nodes: &[Node]) -> bool {
    serialize_nodes_to_plain_text(nodes).trim().is_empty()
}

/// Copy of `nodes` holding at most `max` characters of leaf text.
///
/// Structure is kept: the last leaf reached is cut, everything after it is
/// dropped and elements left without children disappear. Void elements do
/// not count against the limit and are kept whole while the limit allows more text.
pub fn truncate_to_length(nodes: &[Node], max: usize) -> Vec<Node> {
    let mut remaining = max;
    truncate_nodes(nodes, &mut remaining)
}

fn truncate_nodes(nodes: &[Node], remaining: &mut usize) -> Vec<Node> {
    let mut out = Vec::new();
    for node in nodes {
        if *remaining == 0 {
            break;
        }
        match node {
            Node::Leaf(leaf) => {
                let len = leaf.len();
                let mut leaf = leaf.clone();
                if len > *remaining {
                    let cut = leaf.byte_index(*remaining);
                    leaf.text.truncate(cut);
                    *remaining = 0;
                } else {
                    *remaining -= len;
                }
                out.push(Node::Leaf(leaf));
            }
            Node::Element(element) if element.is_void() || element.kind == ElementType::Table => {
                out.push(node.clone());
            }
            Node::Element(element) => {
                let children = truncate_nodes(&element.children, remaining);
                if !children.is_empty() {
                    out.push(Node::Element(Element {
                        kind: element.kind.clone(),
                        children,
                        attrs: element.attrs.clone(),
                    }));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_block(key: &str) -> Node {
        Node::element(
            ElementType::ImageBlock,
            vec![
                Node::Element(Element::void(ElementType::Image).with_attr("objectKey", key)),
                Node::Element(Element::caption()),
            ],
        )
    }

    #[test]
    fn test_image_contributes_object_key() {
        let text = serialize_to_plain_text(&image_block("uploads/fig1.png"));
        assert_eq!(text, "uploads/fig1.png\n");
        assert!(!is_blank(&[image_block("uploads/fig1.png")]));
    }

    #[test]
    fn test_table_contributes_marker() {
        let table = Node::element(
            ElementType::Table,
            vec![Node::element(
                ElementType::TableRow,
                vec![Node::element(
                    ElementType::TableCell,
                    vec![Node::Element(Element::paragraph(""))],
                )],
            )],
        );
        assert_eq!(serialize_to_plain_text(&table), TABLE_MARKER);
    }

    #[test]
    fn test_inline_content_is_concatenated() {
        let paragraph = Node::element(
            ElementType::Paragraph,
            vec![
                Node::text("See "),
                Node::element(ElementType::Link, vec![Node::text("here")]),
                Node::text(" and "),
                Node::Element(Element::void(ElementType::InlineEquation).with_attr("latex", "x^2")),
                Node::text(""),
            ],
        );
        assert_eq!(serialize_to_plain_text(&paragraph), "See here and x^2");
    }

    #[test]
    fn test_blank_fields() {
        assert!(is_blank(&[Node::Element(Element::paragraph("  "))]));
        assert!(is_blank(&[]));
    }

    #[test]
    fn test_truncate_cuts_last_leaf_and_drops_rest() {
        let nodes = vec![
            Node::Element(Element::paragraph("héllo")),
            Node::Element(Element::paragraph("world")),
            Node::Element(Element::paragraph("gone")),
        ];
        let out = truncate_to_length(&nodes, 7);
        assert_eq!(
            out,
            vec![
                Node::Element(Element::paragraph("héllo")),
                Node::Element(Element::paragraph("wo")),
            ]
        );
    }

    #[test]
    fn test_truncate_keeps_voids_whole() {
        let nodes = vec![
            Node::Element(Element::paragraph("ab")),
            image_block("k"),
            Node::Element(Element::paragraph("cd")),
        ];
        let out = truncate_to_length(&nodes, 3);
        assert_eq!(out.len(), 3);
        assert_eq!(serialize_nodes_to_plain_text(&out), "ab\nk\n\nc");
    }
}

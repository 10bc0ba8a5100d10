//! Structural rules every document obeys, whatever plugins are installed:
//!
//! - containers of blocks hold blocks; stray inline content is wrapped in a paragraph
//! - text blocks and inline elements hold leaves and inline elements only
//! - every inline element sits between two leaves
//! - adjacent leaves with the same marks are merged, empty ones dropped
//! - voids hold exactly one empty leaf
//! - a leaf is never both subscript and superscript
//! - no element is left without children

use std::rc::Rc;

use folio_model::{Element, ElementType, Leaf, Mark, Node, Path};
use tracing::debug;

use crate::normalize::{Fix, NodeRef, NormalizeContext, Normalizer};
use crate::operations::NodeProperties;
use crate::plugin::Plugin;
use crate::render::{ElementRenderer, TagRenderer};

pub struct StructurePlugin;

impl Plugin for StructurePlugin {
    fn name(&self) -> &'static str {
        "structure"
    }

    fn normalizer(&self) -> Option<Rc<dyn Normalizer>> {
        Some(Rc::new(StructureNormalizer))
    }

    fn renderers(&self) -> Vec<(ElementType, Rc<dyn ElementRenderer>)> {
        vec![
            (ElementType::Paragraph, Rc::new(TagRenderer::new("p"))),
            (ElementType::Caption, Rc::new(TagRenderer::new("figcaption"))),
        ]
    }
}

pub struct StructureNormalizer;

impl Normalizer for StructureNormalizer {
    fn name(&self) -> &'static str {
        "structure"
    }

    fn normalize(&self, entry: NodeRef<'_>, path: &Path, cx: &mut NormalizeContext<'_>) -> bool {
        match entry {
            NodeRef::Leaf(leaf) => normalize_leaf(leaf, path, cx),
            NodeRef::Root(_) => normalize_block_children(entry.children(), path, cx),
            NodeRef::Element(element) => normalize_element(element, path, cx),
        }
    }
}

fn normalize_element(element: &Element, path: &Path, cx: &mut NormalizeContext<'_>) -> bool {
    let kind = &element.kind;
    if matches!(kind, ElementType::Custom(_)) || kind.is_composite() {
        return false;
    }

    if element.children.is_empty() {
        let node = if kind.is_block_container() {
            Node::Element(Element::paragraph(""))
        } else {
            Node::text("")
        };
        return cx.fix(Fix::InsertNode {
            path: path.child(0),
            node,
        });
    }

    if element.is_void() {
        return normalize_void(element, path, cx);
    }
    if kind.is_block_container() {
        return normalize_block_children(&element.children, path, cx);
    }
    if kind.is_text_block() || element.is_inline() {
        return normalize_inline_children(element, path, cx);
    }
    false
}

/// Subscript wins when a stored leaf carries both
fn normalize_leaf(leaf: &Leaf, path: &Path, cx: &mut NormalizeContext<'_>) -> bool {
    if !(leaf.marks.has(Mark::Subscript) && leaf.marks.has(Mark::Superscript)) {
        return false;
    }
    let mut marks = leaf.marks;
    marks.set(Mark::Superscript, false);
    debug!(path = %path, "Clearing superscript from a subscript leaf");
    cx.fix(Fix::SetNode {
        path: path.clone(),
        properties: NodeProperties::marks(marks),
    })
}

/// A void holds a single empty leaf
fn normalize_void(element: &Element, path: &Path, cx: &mut NormalizeContext<'_>) -> bool {
    let children = &element.children;
    if children.len() > 1 {
        return cx.fix(Fix::RemoveNode {
            path: path.child(children.len() - 1),
        });
    }
    match children.first() {
        Some(Node::Leaf(leaf)) if leaf.is_empty() => false,
        _ => cx.fix(Fix::RemoveNode { path: path.child(0) }),
    }
}

fn normalize_block_children(children: &[Node], path: &Path, cx: &mut NormalizeContext<'_>) -> bool {
    if children.is_empty() {
        return cx.fix(Fix::InsertNode {
            path: path.child(0),
            node: Node::Element(Element::paragraph("")),
        });
    }

    let is_inline_content = |node: &Node| node.is_leaf() || node.is_inline();
    if let Some(start) = children.iter().position(is_inline_content) {
        let end = children[start..]
            .iter()
            .position(|node| !is_inline_content(node))
            .map_or(children.len(), |len| start + len);
        debug!(parent = %path, start, end, "Wrapping inline content in a paragraph");
        return cx.fix(Fix::WrapNodes {
            parent: path.clone(),
            start,
            end,
            wrapper: Element::paragraph(""),
        });
    }

    // A caption only means something inside a composite block
    if let Some(index) = children.iter().position(|node| node.is_type(&ElementType::Caption)) {
        return cx.fix(Fix::SetNode {
            path: path.child(index),
            properties: NodeProperties::kind(ElementType::Paragraph),
        });
    }
    false
}

fn normalize_inline_children(element: &Element, path: &Path, cx: &mut NormalizeContext<'_>) -> bool {
    let children = &element.children;
    for (index, child) in children.iter().enumerate() {
        let child_path = path.child(index);
        let previous = index.checked_sub(1).and_then(|previous| children.get(previous));

        match child {
            Node::Element(inner) if !inner.is_inline() => {
                return cx.fix(Fix::UnwrapNode { path: child_path });
            }
            Node::Element(inner) => {
                if !element.kind.accepts_inline(&inner.kind) {
                    debug!(path = %child_path, kind = %inner.kind, parent = %element.kind, "Inline not allowed here");
                    return cx.fix(Fix::RemoveNode { path: child_path });
                }
                if !previous.is_some_and(Node::is_leaf) {
                    return cx.fix(Fix::InsertNode {
                        path: child_path,
                        node: Node::text(""),
                    });
                }
                if index + 1 == children.len() {
                    return cx.fix(Fix::InsertNode {
                        path: path.child(index + 1),
                        node: Node::text(""),
                    });
                }
            }
            Node::Leaf(leaf) => {
                let Some(Node::Leaf(previous)) = previous else {
                    continue;
                };
                if previous.marks == leaf.marks {
                    return cx.fix(Fix::MergeNode { path: child_path });
                }
                if previous.is_empty() {
                    return cx.fix(Fix::RemoveNode {
                        path: path.child(index - 1),
                    });
                }
                if leaf.is_empty() {
                    return cx.fix(Fix::RemoveNode { path: child_path });
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::{Document, Leaf, Mark, Marks};

    use crate::Editor;

    fn normalized(children: Vec<Node>) -> Document {
        Editor::new(Document::new(children)).unwrap().take_document()
    }

    #[test]
    fn test_empty_document_gets_a_paragraph() {
        let document = normalized(Vec::new());
        assert_eq!(document.children, vec![Node::Element(Element::paragraph(""))]);
    }

    #[test]
    fn test_adjacent_leaves_merge() {
        let paragraph = Node::element(ElementType::Paragraph, vec![Node::text("ab"), Node::text("cd")]);
        let document = normalized(vec![paragraph]);
        assert_eq!(document.children, vec![Node::Element(Element::paragraph("abcd"))]);
    }

    #[test]
    fn test_empty_leaf_next_to_formatted_leaf_is_dropped() {
        let bold = Leaf::with_marks("b", Marks::none().with(Mark::Bold));
        let paragraph = Node::element(ElementType::Paragraph, vec![Node::text(""), Node::Leaf(bold.clone())]);
        let document = normalized(vec![paragraph]);
        assert_eq!(document.children[0].children(), &[Node::Leaf(bold)]);
    }

    #[test]
    fn test_inline_gets_spacer_leaves() {
        let link = Node::Element(Element::new(ElementType::Link, vec![Node::text("x")]).with_attr("url", "u"));
        let paragraph = Node::element(ElementType::Paragraph, vec![link]);
        let document = normalized(vec![paragraph]);

        let children = document.children[0].children();
        assert_eq!(children.len(), 3);
        assert!(children[0].is_leaf());
        assert!(children[1].is_type(&ElementType::Link));
        assert!(children[2].is_leaf());
    }

    #[test]
    fn test_block_inside_paragraph_is_unwrapped() {
        let inner = Node::Element(Element::paragraph("inner"));
        let paragraph = Node::element(ElementType::Paragraph, vec![Node::text("a"), inner]);
        let document = normalized(vec![paragraph]);
        assert_eq!(document.children, vec![Node::Element(Element::paragraph("ainner"))]);
    }

    #[test]
    fn test_caption_drops_blocks_and_references() {
        let image = Node::Element(Element::void(ElementType::Image).with_attr("objectKey", "k"));
        let reference = Node::Element(Element::void(ElementType::Reference).with_attr("refId", "r1"));
        let caption = Node::element(
            ElementType::Caption,
            vec![Node::text("a"), Node::Element(Element::paragraph("inner")), reference],
        );
        let document = normalized(vec![Node::element(ElementType::ImageBlock, vec![image, caption])]);

        let caption = &document.children[0].children()[1];
        assert!(caption.is_type(&ElementType::Caption));
        assert_eq!(caption.children(), &[Node::text("ainner")]);
    }

    #[test]
    fn test_disallowed_inline_element_is_removed() {
        let inner = Node::Element(Element::new(ElementType::Link, vec![Node::text("y")]).with_attr("url", "v"));
        let outer = Node::Element(Element::new(ElementType::Link, vec![Node::text("x"), inner]).with_attr("url", "u"));
        let document = normalized(vec![Node::element(ElementType::Paragraph, vec![Node::text("a"), outer])]);

        assert_eq!(document.children[0].string(), "ax");
        let links = document
            .descendants()
            .filter(|(_, node)| node.is_type(&ElementType::Link))
            .count();
        assert_eq!(links, 1);
    }

    #[test]
    fn test_subscript_and_superscript_never_share_a_leaf() {
        let marks = Marks {
            subscript: true,
            superscript: true,
            ..Marks::none()
        };
        let paragraph = Node::element(ElementType::Paragraph, vec![Node::Leaf(Leaf::with_marks("x", marks))]);
        let document = normalized(vec![paragraph]);

        let (_, leaf) = document.leaves().next().unwrap();
        assert!(leaf.marks.has(Mark::Subscript));
        assert!(!leaf.marks.has(Mark::Superscript));
    }

    #[test]
    fn test_void_keeps_one_empty_leaf() {
        let equation = Element::new(ElementType::Equation, vec![Node::text("junk"), Node::text("more")])
            .with_attr("latex", "x");
        let document = normalized(vec![Node::Element(equation)]);
        assert_eq!(document.children[0].children(), &[Node::text("")]);
    }

    #[test]
    fn test_stray_caption_becomes_paragraph() {
        let document = normalized(vec![Node::Element(Element::caption())]);
        assert!(document.children[0].is_type(&ElementType::Paragraph));
    }

    #[test]
    fn test_root_inline_run_is_wrapped() {
        let document = normalized(vec![
            Node::text("a"),
            Node::text("b"),
            Node::Element(Element::paragraph("c")),
        ]);
        assert_eq!(
            document.children,
            vec![
                Node::Element(Element::paragraph("ab")),
                Node::Element(Element::paragraph("c")),
            ]
        );
    }
}

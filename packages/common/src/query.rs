//! Document-wide queries and rebuilds over node lists
//!
//! These work on snapshots: they borrow or consume node lists and never touch
//! a document owned by an editor.

use folio_model::{Element, ElementType, Node};

use crate::visitor::{walk_element, walk_element_mut, Visitor, VisitorMut};

/// Attributes that only describe an in-progress client-side operation
pub const TRANSIENT_ATTRS: &[&str] = &["uploading"];

struct TypeFinder<'a, 'ast> {
    kind: &'a ElementType,
    found: Vec<&'ast Node>,
}

impl<'a, 'ast> Visitor<'ast> for TypeFinder<'a, 'ast> {
    fn visit_node(&mut self, node: &'ast Node) {
        if let Node::Element(element) = node {
            if element.kind == *self.kind {
                self.found.push(node);
            }
            walk_element(self, element);
        }
    }
}

/// Every node of type `kind` at or below `nodes`, in document order
pub fn find_nodes_by_type<'ast>(nodes: &'ast [Node], kind: &ElementType) -> Vec<&'ast Node> {
    let mut finder = TypeFinder {
        kind,
        found: Vec::new(),
    };
    for node in nodes {
        finder.visit_node(node);
    }
    finder.found
}

/// Rebuild `nodes` without the nodes matching `predicate`.
///
/// Children are filtered before their parent is tested, so the predicate sees
/// each element with its surviving children. Survivors keep their order.
pub fn remove_nodes_by_predicate<F>(nodes: Vec<Node>, predicate: F) -> Vec<Node>
where
    F: Fn(&Node) -> bool,
{
    remove_matching(nodes, &predicate)
}

fn remove_matching<F>(nodes: Vec<Node>, predicate: &F) -> Vec<Node>
where
    F: Fn(&Node) -> bool,
{
    nodes
        .into_iter()
        .filter_map(|node| {
            let node = match node {
                Node::Element(mut element) => {
                    element.children = remove_matching(element.children, predicate);
                    Node::Element(element)
                }
                leaf => leaf,
            };
            (!predicate(&node)).then_some(node)
        })
        .collect()
}

struct TransientStripper;

impl VisitorMut for TransientStripper {
    fn visit_element_mut(&mut self, element: &mut Element) {
        for attr in TRANSIENT_ATTRS {
            element.remove_attr(attr);
        }
        walk_element_mut(self, element);
    }
}

/// Drop client-only attributes such as upload progress before a tree leaves the editor
pub fn strip_transient_attrs(nodes: &mut [Node]) {
    for node in nodes {
        TransientStripper.visit_node_mut(node);
    }
}

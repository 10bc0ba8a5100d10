use folio_model::{Document, Element, Leaf, Node};

/// Visitor pattern for traversing document trees immutably
///
/// This trait provides default implementations that walk the entire tree.
/// Override specific visit_* methods to perform custom actions on nodes.
/// The `'ast` lifetime lets visitors keep references to the nodes they see.
pub trait Visitor<'ast>: Sized {
    fn visit_document(&mut self, doc: &'ast Document) {
        walk_nodes(self, &doc.children);
    }

    fn visit_node(&mut self, node: &'ast Node) {
        walk_node(self, node);
    }

    fn visit_element(&mut self, element: &'ast Element) {
        walk_element(self, element);
    }

    fn visit_leaf(&mut self, _leaf: &'ast Leaf) {
        // Leaf node, no children to walk
    }
}

/// Mutable visitor pattern for rewriting document trees
///
/// Similar to Visitor, but provides mutable access to nodes.
/// Structural edits belong to the editor; use this for attribute rewrites.
pub trait VisitorMut: Sized {
    fn visit_document_mut(&mut self, doc: &mut Document) {
        walk_nodes_mut(self, &mut doc.children);
    }

    fn visit_node_mut(&mut self, node: &mut Node) {
        walk_node_mut(self, node);
    }

    fn visit_element_mut(&mut self, element: &mut Element) {
        walk_element_mut(self, element);
    }

    fn visit_leaf_mut(&mut self, _leaf: &mut Leaf) {
        // Leaf node, no children to walk
    }
}

// Walk functions for immutable visitor

pub fn walk_nodes<'ast, V: Visitor<'ast>>(visitor: &mut V, nodes: &'ast [Node]) {
    for node in nodes {
        visitor.visit_node(node);
    }
}

pub fn walk_node<'ast, V: Visitor<'ast>>(visitor: &mut V, node: &'ast Node) {
    match node {
        Node::Leaf(leaf) => visitor.visit_leaf(leaf),
        Node::Element(element) => visitor.visit_element(element),
    }
}

pub fn walk_element<'ast, V: Visitor<'ast>>(visitor: &mut V, element: &'ast Element) {
    walk_nodes(visitor, &element.children);
}

// Walk functions for mutable visitor

pub fn walk_nodes_mut<V: VisitorMut>(visitor: &mut V, nodes: &mut [Node]) {
    for node in nodes {
        visitor.visit_node_mut(node);
    }
}

pub fn walk_node_mut<V: VisitorMut>(visitor: &mut V, node: &mut Node) {
    match node {
        Node::Leaf(leaf) => visitor.visit_leaf_mut(leaf),
        Node::Element(element) => visitor.visit_element_mut(element),
    }
}

pub fn walk_element_mut<V: VisitorMut>(visitor: &mut V, element: &mut Element) {
    walk_nodes_mut(visitor, &mut element.children);
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::{ElementType, Mark, Marks};

    #[derive(Default)]
    struct LeafCounter {
        leaves: usize,
        elements: usize,
    }

    impl<'ast> Visitor<'ast> for LeafCounter {
        fn visit_element(&mut self, element: &'ast Element) {
            self.elements += 1;
            walk_element(self, element);
        }

        fn visit_leaf(&mut self, _leaf: &'ast Leaf) {
            self.leaves += 1;
        }
    }

    struct Embolden;

    impl VisitorMut for Embolden {
        fn visit_leaf_mut(&mut self, leaf: &mut Leaf) {
            leaf.marks.set(Mark::Bold, true);
        }
    }

    fn sample() -> Document {
        Document::new(vec![
            Node::Element(Element::paragraph("a")),
            Node::element(
                ElementType::BulletedList,
                vec![Node::element(
                    ElementType::ListItem,
                    vec![Node::Element(Element::paragraph("b"))],
                )],
            ),
        ])
    }

    #[test]
    fn test_visitor_counts_nodes() {
        let doc = sample();
        let mut counter = LeafCounter::default();
        counter.visit_document(&doc);
        assert_eq!(counter.leaves, 2);
        assert_eq!(counter.elements, 4);
    }

    #[test]
    fn test_visitor_mut_rewrites_leaves() {
        let mut doc = sample();
        Embolden.visit_document_mut(&mut doc);
        assert!(doc
            .leaves()
            .all(|(_, leaf)| leaf.marks == Marks::none().with(Mark::Bold)));
    }
}

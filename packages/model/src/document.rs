//! # Document Root
//!
//! The root of the tree. It has no type of its own, only children, and is
//! addressed by the empty path.
//!
//! A fresh document holds one empty paragraph. Documents restored from
//! storage go through [`crate::persist`] first.

use serde::{Deserialize, Serialize};

use crate::{Element, ElementType, Leaf, ModelError, ModelResult, Node, Path, Point, Range};

/// Attribute set on the sentinel that replaces unreadable stored content
pub const INVALID_CONTENT_ATTR: &str = "invalidContent";

/// Text shown in place of unreadable stored content
pub const INVALID_CONTENT_TEXT: &str = "This content could not be displayed.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Default for Document {
    /// One empty paragraph
    fn default() -> Self {
        Self {
            children: vec![Node::Element(Element::paragraph(""))],
        }
    }
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Sentinel substituted for values that fail validation
    pub fn invalid_content() -> Self {
        let paragraph = Element::paragraph(INVALID_CONTENT_TEXT).with_attr(INVALID_CONTENT_ATTR, true);
        Self {
            children: vec![Node::Element(paragraph)],
        }
    }

    pub fn is_invalid_sentinel(&self) -> bool {
        matches!(
            self.children.as_slice(),
            [Node::Element(element)] if element.attr(INVALID_CONTENT_ATTR).is_some()
        )
    }

    /// Node at a non-root path
    pub fn node(&self, path: &Path) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        self.children.get(*first)?.descendant(rest)
    }

    pub fn node_mut(&mut self, path: &Path) -> Option<&mut Node> {
        let (first, rest) = path.split_first()?;
        self.children.get_mut(*first)?.descendant_mut(rest)
    }

    pub fn has_node(&self, path: &Path) -> bool {
        path.is_root() || self.node(path).is_some()
    }

    /// Children of the node at `path`; the root path yields the document's children
    pub fn children_at(&self, path: &Path) -> Option<&[Node]> {
        if path.is_root() {
            return Some(&self.children);
        }
        match self.node(path)? {
            Node::Element(element) => Some(&element.children),
            Node::Leaf(_) => None,
        }
    }

    pub fn children_at_mut(&mut self, path: &Path) -> Option<&mut Vec<Node>> {
        if path.is_root() {
            return Some(&mut self.children);
        }
        self.node_mut(path)?.children_mut()
    }

    pub fn element(&self, path: &Path) -> ModelResult<&Element> {
        self.node(path)
            .ok_or_else(|| ModelError::PathNotFound(path.clone()))?
            .as_element()
            .ok_or_else(|| ModelError::NotAnElement(path.clone()))
    }

    pub fn leaf(&self, path: &Path) -> ModelResult<&Leaf> {
        self.node(path)
            .ok_or_else(|| ModelError::PathNotFound(path.clone()))?
            .as_leaf()
            .ok_or_else(|| ModelError::NotALeaf(path.clone()))
    }

    /// Element type of the node at `path`; `None` for leaves, the root and missing paths
    pub fn type_at(&self, path: &Path) -> Option<&ElementType> {
        self.node(path).and_then(Node::element_type)
    }

    /// Every node below the root, pre-order, with its path
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::new(&self.children, Path::root())
    }

    /// Every node below `path`, pre-order, excluding the node itself
    pub fn descendants_of(&self, path: &Path) -> Descendants<'_> {
        let children = self.children_at(path).unwrap_or(&[]);
        Descendants::new(children, path.clone())
    }

    /// Leaves in document order
    pub fn leaves(&self) -> impl Iterator<Item = (Path, &Leaf)> + '_ {
        self.descendants()
            .filter_map(|(path, node)| node.as_leaf().map(|leaf| (path, leaf)))
    }

    /// Ancestor elements of `path`, closest first
    pub fn ancestors(&self, path: &Path) -> Vec<(Path, &Element)> {
        let mut ancestors: Vec<(Path, &Element)> = path
            .ancestors()
            .into_iter()
            .filter_map(|ancestor| {
                let element = self.node(&ancestor)?.as_element()?;
                Some((ancestor, element))
            })
            .collect();
        ancestors.reverse();
        ancestors
    }

    /// Closest element at or above `path` matching `predicate`
    pub fn above(
        &self,
        path: &Path,
        predicate: impl Fn(&Element) -> bool,
    ) -> Option<(Path, &Element)> {
        if let Some(Node::Element(element)) = self.node(path) {
            if predicate(element) {
                return Some((path.clone(), element));
            }
        }
        self.ancestors(path)
            .into_iter()
            .find(|(_, element)| predicate(element))
    }

    /// Closest text block (paragraph, caption) at or above `path`
    pub fn text_block_above(&self, path: &Path) -> Option<(Path, &Element)> {
        self.above(path, |element| element.kind.is_text_block())
    }

    /// Closest void element at or above `path`
    pub fn void_above(&self, path: &Path) -> Option<(Path, &Element)> {
        self.above(path, Element::is_void)
    }

    /// First leaf position at or below `path`
    pub fn start_of(&self, path: &Path) -> Option<Point> {
        if let Some(Node::Leaf(_)) = self.node(path) {
            return Some(Point::new(path.clone(), 0));
        }
        self.descendants_of(path)
            .find(|(_, node)| node.is_leaf())
            .map(|(path, _)| Point::new(path, 0))
    }

    /// Last leaf position at or below `path`
    pub fn end_of(&self, path: &Path) -> Option<Point> {
        if let Some(Node::Leaf(leaf)) = self.node(path) {
            return Some(Point::new(path.clone(), leaf.len()));
        }
        self.descendants_of(path)
            .filter_map(|(path, node)| node.as_leaf().map(|leaf| (path, leaf.len())))
            .last()
            .map(|(path, len)| Point::new(path, len))
    }

    pub fn start(&self) -> Option<Point> {
        self.start_of(&Path::root())
    }

    pub fn end(&self) -> Option<Point> {
        self.end_of(&Path::root())
    }

    /// Range covering the whole node at `path`
    pub fn range_of(&self, path: &Path) -> Option<Range> {
        Some(Range::new(self.start_of(path)?, self.end_of(path)?))
    }

    /// Leaf paths between two points, inclusive, in document order
    pub fn leaf_paths_between(&self, start: &Point, end: &Point) -> Vec<Path> {
        self.leaves()
            .map(|(path, _)| path)
            .filter(|path| !path.is_before(&start.path) && !path.is_after(&end.path))
            .collect()
    }

    /// Closest valid point to a path that may no longer exist: the end of the
    /// last leaf before it, otherwise the start of the first leaf after it
    pub fn point_near(&self, path: &Path) -> Option<Point> {
        let mut before = None;
        for (leaf_path, leaf) in self.leaves() {
            if leaf_path.is_before(path) {
                before = Some(Point::new(leaf_path, leaf.len()));
            } else if before.is_none() || leaf_path.compare(path).is_eq() {
                return Some(Point::new(leaf_path, 0));
            } else {
                break;
            }
        }
        before
    }

    /// Whether a point addresses an existing leaf and an in-bounds offset
    pub fn contains_point(&self, point: &Point) -> bool {
        matches!(self.leaf(&point.path), Ok(leaf) if point.offset <= leaf.len())
    }
}

/// Pre-order walk over a node list
pub struct Descendants<'a> {
    stack: Vec<(Path, &'a Node)>,
}

impl<'a> Descendants<'a> {
    fn new(children: &'a [Node], base: Path) -> Self {
        let stack = children
            .iter()
            .enumerate()
            .rev()
            .map(|(index, node)| (base.child(index), node))
            .collect();
        Self { stack }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (Path, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.stack.pop()?;
        for (index, child) in node.children().iter().enumerate().rev() {
            self.stack.push((path.child(index), child));
        }
        Some((path, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::new(vec![
            Node::Element(Element::paragraph("one")),
            Node::element(
                ElementType::BulletedList,
                vec![Node::element(
                    ElementType::ListItem,
                    vec![Node::Element(Element::paragraph("two"))],
                )],
            ),
        ])
    }

    #[test]
    fn test_default_is_one_empty_paragraph() {
        let doc = Document::default();
        assert_eq!(doc.children.len(), 1);
        assert_eq!(doc.type_at(&Path::from([0])), Some(&ElementType::Paragraph));
        assert_eq!(doc.start(), Some(Point::new([0, 0], 0)));
    }

    #[test]
    fn test_descendants_are_pre_order() {
        let doc = sample();
        let paths: Vec<Vec<usize>> = doc.descendants().map(|(path, _)| path.to_vec()).collect();
        assert_eq!(
            paths,
            vec![
                vec![0],
                vec![0, 0],
                vec![1],
                vec![1, 0],
                vec![1, 0, 0],
                vec![1, 0, 0, 0],
            ]
        );
    }

    #[test]
    fn test_text_block_above() {
        let doc = sample();
        let (path, element) = doc.text_block_above(&Path::from([1, 0, 0, 0])).unwrap();
        assert_eq!(path, Path::from([1, 0, 0]));
        assert_eq!(element.kind, ElementType::Paragraph);
    }

    #[test]
    fn test_point_near_removed_path() {
        let doc = sample();
        assert_eq!(doc.point_near(&Path::from([0, 5])), Some(Point::new([0, 0], 3)));
        assert_eq!(doc.point_near(&Path::from([0])), Some(Point::new([0, 0], 0)));
    }

    #[test]
    fn test_invalid_sentinel_is_recognised() {
        assert!(Document::invalid_content().is_invalid_sentinel());
        assert!(!Document::default().is_invalid_sentinel());
    }
}

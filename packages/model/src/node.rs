//! Document tree nodes

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{Element, ElementType, Marks, Path};

/// Text-bearing node with formatting marks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf {
    pub text: String,

    #[serde(flatten)]
    pub marks: Marks,
}

impl Leaf {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::none(),
        }
    }

    pub fn with_marks(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    /// Length in characters; offsets inside a leaf count characters, not bytes
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte index of a character offset, clamped to the end of the text
    pub fn byte_index(&self, offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(offset)
            .map(|(index, _)| index)
            .unwrap_or(self.text.len())
    }
}

/// Either a leaf or an element.
///
/// An object with a `text` key is always a leaf; anything else is read as an
/// element. A malformed leaf is an error rather than an element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Leaf(Leaf),
    Element(Element),
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let is_leaf = value.as_object().is_some_and(|fields| fields.contains_key("text"));
        let node = if is_leaf {
            Leaf::deserialize(value).map(Node::Leaf)
        } else {
            Element::deserialize(value).map(Node::Element)
        };
        node.map_err(D::Error::custom)
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Leaf(Leaf::new(text))
    }

    pub fn element(kind: ElementType, children: Vec<Node>) -> Self {
        Node::Element(Element::new(kind, children))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Element(_) => None,
        }
    }

    pub fn as_leaf_mut(&mut self) -> Option<&mut Leaf> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Leaf(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Leaf(_) => None,
        }
    }

    pub fn element_type(&self) -> Option<&ElementType> {
        self.as_element().map(|element| &element.kind)
    }

    pub fn is_type(&self, kind: &ElementType) -> bool {
        self.element_type() == Some(kind)
    }

    /// Leaves and inline elements
    pub fn is_inline(&self) -> bool {
        match self {
            Node::Leaf(_) => true,
            Node::Element(element) => element.is_inline(),
        }
    }

    pub fn is_void(&self) -> bool {
        self.as_element().is_some_and(Element::is_void)
    }

    /// Children of an element; leaves have none
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(element) => &element.children,
            Node::Leaf(_) => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Element(element) => Some(&mut element.children),
            Node::Leaf(_) => None,
        }
    }

    /// Merge position: character count for leaves, child count for elements
    pub fn len(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.len(),
            Node::Element(element) => element.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Descendant at a path relative to this node
    pub fn descendant(&self, path: &[usize]) -> Option<&Node> {
        let mut node = self;
        for index in path {
            node = node.children().get(*index)?;
        }
        Some(node)
    }

    pub fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let mut node = self;
        for index in path {
            node = node.children_mut()?.get_mut(*index)?;
        }
        Some(node)
    }

    /// Naive concatenation of all leaf text below this node
    pub fn string(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Relative paths of every descendant, pre-order, including `[]` for the node itself
    pub fn relative_paths(&self) -> Vec<Path> {
        let mut paths = vec![Path::root()];
        collect_paths(self, &Path::root(), &mut paths);
        paths
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Leaf(leaf) => out.push_str(&leaf.text),
        Node::Element(element) => {
            for child in &element.children {
                collect_text(child, out);
            }
        }
    }
}

fn collect_paths(node: &Node, prefix: &Path, out: &mut Vec<Path>) {
    for (index, child) in node.children().iter().enumerate() {
        let path = prefix.child(index);
        out.push(path.clone());
        collect_paths(child, &path, out);
    }
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Node::Leaf(leaf)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mark;
    use serde_json::json;

    #[test]
    fn test_leaf_deserializes_before_element() {
        let node: Node = serde_json::from_value(json!({ "text": "hi", "bold": true })).unwrap();
        let leaf = node.as_leaf().unwrap();
        assert_eq!(leaf.text, "hi");
        assert!(leaf.marks.has(Mark::Bold));
    }

    #[test]
    fn test_malformed_leaf_is_not_read_as_element() {
        let result = serde_json::from_value::<Node>(json!({ "text": "hello", "bold": "yes" }));
        assert!(result.is_err());

        let node: Node = serde_json::from_value(json!({ "type": "link", "children": [{ "text": "x" }] })).unwrap();
        assert_eq!(node.element_type(), Some(&ElementType::Link));
    }

    #[test]
    fn test_string_concatenates_leaves() {
        let node = Node::element(
            ElementType::Paragraph,
            vec![
                Node::text("Hello, "),
                Node::element(ElementType::Link, vec![Node::text("world")]),
            ],
        );
        assert_eq!(node.string(), "Hello, world");
    }

    #[test]
    fn test_leaf_offsets_count_characters() {
        let leaf = Leaf::new("héllo");
        assert_eq!(leaf.len(), 5);
        assert_eq!(leaf.byte_index(2), 3);
        assert_eq!(leaf.byte_index(99), leaf.text.len());
    }

    #[test]
    fn test_relative_paths_are_pre_order() {
        let node = Node::element(
            ElementType::Table,
            vec![Node::element(
                ElementType::TableRow,
                vec![Node::element(ElementType::TableCell, vec![])],
            )],
        );
        let paths: Vec<Vec<usize>> = node
            .relative_paths()
            .into_iter()
            .map(|path| path.to_vec())
            .collect();
        assert_eq!(paths, vec![vec![], vec![0], vec![0, 0]]);
    }
}

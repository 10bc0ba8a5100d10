//! # Operations
//!
//! The primitive edits every document change is expressed in. Higher-level
//! transforms (wrapping, splitting blocks, toggling marks) emit sequences of
//! these, and the normalization engine repairs the tree with them too.
//!
//! ## Semantics
//!
//! - Positions are child indices for elements and character offsets for leaves
//! - `SplitNode` copies the node's own properties onto the new right half,
//!   then overlays `properties`
//! - `MergeNode` appends the node's content to its previous sibling and removes it
//! - `MoveNode` uses the target path as it reads *before* the node is removed;
//!   a move to a later sibling index lands on that index
//! - `SetNode` uses `Value::Null` in `new_properties.attrs` to remove an attribute
//!
//! Every operation validates before it touches the document: a failed
//! operation leaves the tree untouched.

use folio_model::{
    Affinity, Attrs, Document, Element, ElementType, Leaf, Marks, Node, Path, Range, TreeChange,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Primitive, validated document edits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    InsertNode {
        path: Path,
        node: Node,
    },

    RemoveNode {
        path: Path,
        node: Node,
    },

    InsertText {
        path: Path,
        offset: usize,
        text: String,
    },

    RemoveText {
        path: Path,
        offset: usize,
        text: String,
    },

    /// Merge the node at `path` into its previous sibling, whose length was `position`
    MergeNode {
        path: Path,
        position: usize,
        properties: NodeProperties,
    },

    /// Split the node at `path` at `position`; the right half lands at the next sibling path
    SplitNode {
        path: Path,
        position: usize,
        properties: NodeProperties,
    },

    MoveNode {
        path: Path,
        new_path: Path,
    },

    SetNode {
        path: Path,
        properties: NodeProperties,
        new_properties: NodeProperties,
    },

    SetSelection {
        selection: Option<Range>,
        new_selection: Option<Range>,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    #[error("Node not found: {0}")]
    NodeNotFound(Path),

    #[error("Parent not found: {0}")]
    ParentNotFound(Path),

    #[error("The document root cannot be inserted, removed or moved")]
    RootPath,

    #[error("Node is not an element: {0}")]
    NotAnElement(Path),

    #[error("Node is not text: {0}")]
    NotText(Path),

    #[error("Position {position} is out of range at {path}")]
    OutOfRange { path: Path, position: usize },

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Cannot merge {0} into a sibling of a different kind")]
    MergeMismatch(Path),

    #[error("No previous sibling to merge {0} into")]
    NoPreviousSibling(Path),
}

/// Type, attributes and marks of a node, or a partial update of them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeProperties {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ElementType>,

    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Marks>,
}

impl NodeProperties {
    pub fn kind(kind: ElementType) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn marks(marks: Marks) -> Self {
        Self {
            marks: Some(marks),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Attribute removal, applied as `Value::Null`
    pub fn without_attr(mut self, key: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), Value::Null);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.attrs.is_empty() && self.marks.is_none()
    }

    /// Everything that describes `node` apart from its content
    pub fn of(node: &Node) -> Self {
        match node {
            Node::Leaf(leaf) => Self::marks(leaf.marks),
            Node::Element(element) => Self {
                kind: Some(element.kind.clone()),
                attrs: element.attrs.clone(),
                marks: None,
            },
        }
    }

    /// Current values on `node` for every field this update touches
    pub fn snapshot(&self, node: &Node) -> Self {
        match node {
            Node::Leaf(leaf) => Self {
                marks: self.marks.map(|_| leaf.marks),
                ..Self::default()
            },
            Node::Element(element) => Self {
                kind: self.kind.as_ref().map(|_| element.kind.clone()),
                attrs: self
                    .attrs
                    .keys()
                    .map(|key| (key.clone(), element.attr(key).cloned().unwrap_or(Value::Null)))
                    .collect(),
                marks: None,
            },
        }
    }

    pub fn apply_to(&self, node: &mut Node) {
        match node {
            Node::Leaf(leaf) => {
                if let Some(marks) = self.marks {
                    leaf.marks = marks;
                }
            }
            Node::Element(element) => {
                if let Some(kind) = &self.kind {
                    element.kind = kind.clone();
                }
                for (key, value) in &self.attrs {
                    if value.is_null() {
                        element.remove_attr(key);
                    } else {
                        element.set_attr(key.clone(), value.clone());
                    }
                }
            }
        }
    }
}

impl Operation {
    /// Apply operation to the document with validation
    pub fn apply(&self, doc: &mut Document) -> Result<(), OperationError> {
        // Validate first
        self.validate(doc)?;

        match self {
            Operation::InsertNode { path, node } => Self::apply_insert(doc, path, node),
            Operation::RemoveNode { path, .. } => Self::apply_remove(doc, path).map(|_| ()),
            Operation::InsertText { path, offset, text } => {
                let leaf = leaf_mut(doc, path)?;
                let at = leaf.byte_index(*offset);
                leaf.text.insert_str(at, text);
                Ok(())
            }
            Operation::RemoveText { path, offset, text } => {
                let leaf = leaf_mut(doc, path)?;
                let start = leaf.byte_index(*offset);
                let end = leaf.byte_index(offset + text.chars().count());
                leaf.text.replace_range(start..end, "");
                Ok(())
            }
            Operation::MergeNode { path, .. } => Self::apply_merge(doc, path),
            Operation::SplitNode {
                path,
                position,
                properties,
            } => Self::apply_split(doc, path, *position, properties),
            Operation::MoveNode { path, new_path } => Self::apply_move(doc, path, new_path),
            Operation::SetNode { path, new_properties, .. } => {
                let node = doc
                    .node_mut(path)
                    .ok_or_else(|| OperationError::NodeNotFound(path.clone()))?;
                new_properties.apply_to(node);
                Ok(())
            }
            Operation::SetSelection { .. } => Ok(()),
        }
    }

    fn apply_insert(doc: &mut Document, path: &Path, node: &Node) -> Result<(), OperationError> {
        let (siblings, index) = siblings_mut(doc, path)?;
        siblings.insert(index, node.clone());
        Ok(())
    }

    fn apply_remove(doc: &mut Document, path: &Path) -> Result<Node, OperationError> {
        let (siblings, index) = siblings_mut(doc, path)?;
        Ok(siblings.remove(index))
    }

    fn apply_merge(doc: &mut Document, path: &Path) -> Result<(), OperationError> {
        let previous = path
            .previous()
            .ok_or_else(|| OperationError::NoPreviousSibling(path.clone()))?;
        let node = Self::apply_remove(doc, path)?;
        let target = doc
            .node_mut(&previous)
            .ok_or_else(|| OperationError::NodeNotFound(previous.clone()))?;

        match (target, node) {
            (Node::Leaf(target), Node::Leaf(leaf)) => target.text.push_str(&leaf.text),
            (Node::Element(target), Node::Element(element)) => {
                target.children.extend(element.children)
            }
            _ => return Err(OperationError::MergeMismatch(path.clone())),
        }
        Ok(())
    }

    fn apply_split(
        doc: &mut Document,
        path: &Path,
        position: usize,
        properties: &NodeProperties,
    ) -> Result<(), OperationError> {
        let node = doc
            .node_mut(path)
            .ok_or_else(|| OperationError::NodeNotFound(path.clone()))?;

        let mut right = match node {
            Node::Leaf(leaf) => {
                let at = leaf.byte_index(position);
                let text = leaf.text.split_off(at);
                Node::Leaf(Leaf::with_marks(text, leaf.marks))
            }
            Node::Element(element) => {
                let children = element.children.split_off(position);
                Node::Element(Element {
                    kind: element.kind.clone(),
                    children,
                    attrs: element.attrs.clone(),
                })
            }
        };
        properties.apply_to(&mut right);

        let next = path.next().ok_or(OperationError::RootPath)?;
        Self::apply_insert(doc, &next, &right)
    }

    fn apply_move(doc: &mut Document, path: &Path, new_path: &Path) -> Result<(), OperationError> {
        if path == new_path {
            return Ok(());
        }

        let change = TreeChange::MoveNode {
            path: path.clone(),
            new_path: new_path.clone(),
        };
        let true_path = path
            .transform(&change, Affinity::Forward)
            .ok_or(OperationError::CycleDetected)?;

        let node = Self::apply_remove(doc, path)?;
        let (parent, index) = parent_and_index(&true_path)?;
        let fits = doc
            .children_at(&parent)
            .is_some_and(|children| index <= children.len());
        if !fits {
            // Put the node back so a failed move leaves the tree as it was
            let (siblings, at) = siblings_mut(doc, path)?;
            siblings.insert(at, node);
            return Err(OperationError::ParentNotFound(parent));
        }

        if let Some(children) = doc.children_at_mut(&parent) {
            children.insert(index, node);
        }
        Ok(())
    }

    /// Check structural constraints without touching the document
    pub fn validate(&self, doc: &Document) -> Result<(), OperationError> {
        match self {
            Operation::InsertNode { path, .. } => {
                let (parent, index) = parent_and_index(path)?;
                let children = container(doc, &parent)?;
                if index > children.len() {
                    return Err(out_of_range(path, index));
                }
                Ok(())
            }

            Operation::RemoveNode { path, .. } | Operation::SetNode { path, .. } => {
                if path.is_root() {
                    return Err(OperationError::RootPath);
                }
                node(doc, path).map(|_| ())
            }

            Operation::InsertText { path, offset, .. } => {
                let leaf = leaf(doc, path)?;
                if *offset > leaf.len() {
                    return Err(out_of_range(path, *offset));
                }
                Ok(())
            }

            Operation::RemoveText { path, offset, text } => {
                let leaf = leaf(doc, path)?;
                let end = offset + text.chars().count();
                if end > leaf.len() {
                    return Err(out_of_range(path, end));
                }
                Ok(())
            }

            Operation::MergeNode { path, .. } => {
                let previous = path
                    .previous()
                    .ok_or_else(|| OperationError::NoPreviousSibling(path.clone()))?;
                let current = node(doc, path)?;
                let target = node(doc, &previous)?;
                if current.is_leaf() != target.is_leaf() {
                    return Err(OperationError::MergeMismatch(path.clone()));
                }
                Ok(())
            }

            Operation::SplitNode { path, position, .. } => {
                if path.is_root() {
                    return Err(OperationError::RootPath);
                }
                let current = node(doc, path)?;
                if *position > current.len() {
                    return Err(out_of_range(path, *position));
                }
                Ok(())
            }

            Operation::MoveNode { path, new_path } => {
                if path.is_root() || new_path.is_root() {
                    return Err(OperationError::RootPath);
                }
                if path.is_ancestor_of(new_path) {
                    return Err(OperationError::CycleDetected);
                }
                node(doc, path)?;
                let (parent, _) = parent_and_index(new_path)?;
                container(doc, &parent).map(|_| ())
            }

            Operation::SetSelection { .. } => Ok(()),
        }
    }

    /// Structural effect used to carry paths, points and ranges across this operation
    pub fn change(&self) -> Option<TreeChange> {
        let change = match self {
            Operation::InsertNode { path, .. } => TreeChange::InsertNode { path: path.clone() },
            Operation::RemoveNode { path, .. } => TreeChange::RemoveNode { path: path.clone() },
            Operation::InsertText { path, offset, text } => TreeChange::InsertText {
                path: path.clone(),
                offset: *offset,
                len: text.chars().count(),
            },
            Operation::RemoveText { path, offset, text } => TreeChange::RemoveText {
                path: path.clone(),
                offset: *offset,
                len: text.chars().count(),
            },
            Operation::MergeNode { path, position, .. } => TreeChange::MergeNode {
                path: path.clone(),
                position: *position,
            },
            Operation::SplitNode { path, position, .. } => TreeChange::SplitNode {
                path: path.clone(),
                position: *position,
            },
            Operation::MoveNode { path, new_path } => TreeChange::MoveNode {
                path: path.clone(),
                new_path: new_path.clone(),
            },
            Operation::SetNode { .. } | Operation::SetSelection { .. } => return None,
        };
        Some(change)
    }

    /// Paths whose subtree may violate an invariant after this operation,
    /// expressed in post-operation coordinates. Computed before applying.
    pub fn dirty_paths(&self) -> Vec<Path> {
        match self {
            Operation::InsertText { path, .. }
            | Operation::RemoveText { path, .. }
            | Operation::SetNode { path, .. } => path.levels(),

            Operation::InsertNode { path, node } => {
                let mut paths = path.levels();
                paths.extend(
                    node.relative_paths()
                        .into_iter()
                        .skip(1)
                        .map(|relative| path.join(&relative)),
                );
                paths
            }

            Operation::RemoveNode { path, .. } => path.ancestors(),

            Operation::MergeNode { path, .. } => {
                let mut paths = path.ancestors();
                paths.extend(path.previous());
                paths
            }

            Operation::SplitNode { path, .. } => {
                let mut paths = path.levels();
                paths.extend(path.next());
                paths
            }

            Operation::MoveNode { path, new_path } => {
                if path == new_path {
                    return Vec::new();
                }
                let Some(change) = self.change() else {
                    return Vec::new();
                };
                let moved = |ancestor: Path| ancestor.transform(&change, Affinity::Forward);

                let mut paths: Vec<Path> = path.ancestors().into_iter().filter_map(moved).collect();
                let new_ancestors: Vec<Path> =
                    new_path.ancestors().into_iter().filter_map(moved).collect();
                if let (Some(new_parent), Some(index)) = (new_ancestors.last(), new_path.index()) {
                    let target = new_parent.child(index);
                    paths.extend(new_ancestors.iter().cloned());
                    paths.push(target);
                } else {
                    paths.extend(new_ancestors);
                }
                paths
            }

            Operation::SetSelection { .. } => Vec::new(),
        }
    }

    /// Whether the operation changes the document rather than only the selection
    pub fn is_document_change(&self) -> bool {
        !matches!(self, Operation::SetSelection { .. })
    }
}

/// Carry `path` across `operations`. `None` once the node is gone.
pub fn rebase_path(path: &Path, operations: &[Operation]) -> Option<Path> {
    operations
        .iter()
        .filter_map(Operation::change)
        .try_fold(path.clone(), |path, change| path.transform(&change, Affinity::Forward))
}

fn parent_and_index(path: &Path) -> Result<(Path, usize), OperationError> {
    match (path.parent(), path.index()) {
        (Some(parent), Some(index)) => Ok((parent, index)),
        _ => Err(OperationError::RootPath),
    }
}

fn out_of_range(path: &Path, position: usize) -> OperationError {
    OperationError::OutOfRange {
        path: path.clone(),
        position,
    }
}

fn node<'a>(doc: &'a Document, path: &Path) -> Result<&'a Node, OperationError> {
    doc.node(path)
        .ok_or_else(|| OperationError::NodeNotFound(path.clone()))
}

fn leaf<'a>(doc: &'a Document, path: &Path) -> Result<&'a Leaf, OperationError> {
    node(doc, path)?
        .as_leaf()
        .ok_or_else(|| OperationError::NotText(path.clone()))
}

fn leaf_mut<'a>(doc: &'a mut Document, path: &Path) -> Result<&'a mut Leaf, OperationError> {
    doc.node_mut(path)
        .ok_or_else(|| OperationError::NodeNotFound(path.clone()))?
        .as_leaf_mut()
        .ok_or_else(|| OperationError::NotText(path.clone()))
}

fn container<'a>(doc: &'a Document, parent: &Path) -> Result<&'a [Node], OperationError> {
    if !doc.has_node(parent) {
        return Err(OperationError::ParentNotFound(parent.clone()));
    }
    doc.children_at(parent)
        .ok_or_else(|| OperationError::NotAnElement(parent.clone()))
}

fn siblings_mut<'a>(
    doc: &'a mut Document,
    path: &Path,
) -> Result<(&'a mut Vec<Node>, usize), OperationError> {
    let (parent, index) = parent_and_index(path)?;
    let siblings = doc
        .children_at_mut(&parent)
        .ok_or(OperationError::ParentNotFound(parent))?;
    if index > siblings.len() {
        return Err(out_of_range(path, index));
    }
    Ok((siblings, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::Mark;

    fn doc() -> Document {
        Document::new(vec![
            Node::Element(Element::paragraph("hello")),
            Node::Element(Element::paragraph("world")),
        ])
    }

    #[test]
    fn test_insert_and_remove_text() {
        let mut doc = doc();
        Operation::InsertText {
            path: Path::from([0, 0]),
            offset: 5,
            text: ", there".to_string(),
        }
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc.leaf(&Path::from([0, 0])).unwrap().text, "hello, there");

        Operation::RemoveText {
            path: Path::from([0, 0]),
            offset: 0,
            text: "hello".to_string(),
        }
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc.leaf(&Path::from([0, 0])).unwrap().text, ", there");
    }

    #[test]
    fn test_split_then_merge_restores_leaf() {
        let mut doc = doc();
        Operation::SplitNode {
            path: Path::from([0, 0]),
            position: 2,
            properties: NodeProperties::marks(Marks::none().with(Mark::Bold)),
        }
        .apply(&mut doc)
        .unwrap();

        let right = doc.leaf(&Path::from([0, 1])).unwrap();
        assert_eq!(right.text, "llo");
        assert!(right.marks.bold);

        Operation::MergeNode {
            path: Path::from([0, 1]),
            position: 2,
            properties: NodeProperties::default(),
        }
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc.leaf(&Path::from([0, 0])).unwrap().text, "hello");
    }

    #[test]
    fn test_move_to_later_sibling() {
        let mut doc = doc();
        Operation::MoveNode {
            path: Path::from([0]),
            new_path: Path::from([1]),
        }
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc.children[0].string(), "world");
        assert_eq!(doc.children[1].string(), "hello");
    }

    #[test]
    fn test_move_into_own_descendant_is_rejected() {
        let mut doc = doc();
        let err = Operation::MoveNode {
            path: Path::from([0]),
            new_path: Path::from([0, 1]),
        }
        .apply(&mut doc)
        .unwrap_err();
        assert_eq!(err, OperationError::CycleDetected);
        assert_eq!(doc, self::doc());
    }

    #[test]
    fn test_merge_rejects_mixed_kinds() {
        let mut doc = Document::new(vec![Node::element(
            ElementType::Paragraph,
            vec![
                Node::text("a"),
                Node::element(ElementType::Link, vec![Node::text("b")]),
            ],
        )]);
        let before = doc.clone();

        let err = Operation::MergeNode {
            path: Path::from([0, 1]),
            position: 1,
            properties: NodeProperties::default(),
        }
        .apply(&mut doc)
        .unwrap_err();
        assert_eq!(err, OperationError::MergeMismatch(Path::from([0, 1])));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_set_node_removes_null_attrs() {
        let mut doc = Document::new(vec![Node::Element(
            Element::void(ElementType::Equation).with_attr("latex", "x"),
        )]);
        let new_properties = NodeProperties::default()
            .without_attr("latex")
            .with_attr("display", true);
        let properties = new_properties.snapshot(&doc.children[0]);
        assert_eq!(properties.attrs.get("latex"), Some(&Value::from("x")));

        Operation::SetNode {
            path: Path::from([0]),
            properties,
            new_properties,
        }
        .apply(&mut doc)
        .unwrap();

        let element = doc.element(&Path::from([0])).unwrap();
        assert_eq!(element.latex(), None);
        assert_eq!(element.attr("display"), Some(&Value::from(true)));
    }

    #[test]
    fn test_insert_dirties_new_subtree() {
        let op = Operation::InsertNode {
            path: Path::from([1]),
            node: Node::Element(Element::paragraph("x")),
        };
        assert_eq!(
            op.dirty_paths(),
            vec![Path::root(), Path::from([1]), Path::from([1, 0])]
        );
    }

    #[test]
    fn test_operation_serializes_with_type_tag() {
        let op = Operation::InsertText {
            path: Path::from([0, 0]),
            offset: 1,
            text: "a".to_string(),
        };
        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value["type"], "insert_text");
        assert_eq!(value["path"], serde_json::json!([0, 0]));
    }
}

//! # Transforms
//!
//! Editing commands expressed as sequences of primitive operations. Multi-step
//! transforms run inside [`Editor::without_normalizing`] so the tree is only
//! repaired once the whole step is done.
//!
//! Paths computed before a step are only reused after a step through
//! [`Editor::rebase_path`].

use folio_model::{Element, ElementType, Node, Path, Point, Range};
use tracing::debug;

use crate::operations::{NodeProperties, Operation, OperationError};
use crate::{Editor, EditorError, EditorResult};

impl Editor {
    pub fn insert_node(&mut self, path: &Path, node: impl Into<Node>) -> EditorResult<()> {
        self.apply(Operation::InsertNode {
            path: path.clone(),
            node: node.into(),
        })
    }

    /// Insert `nodes` as consecutive siblings starting at `path`
    pub fn insert_nodes(&mut self, path: &Path, nodes: Vec<Node>) -> EditorResult<()> {
        let (parent, index) = split_path(path)?;
        self.without_normalizing(|editor| {
            for (offset, node) in nodes.into_iter().enumerate() {
                editor.insert_node(&parent.child(index + offset), node)?;
            }
            Ok(())
        })
    }

    pub fn remove_node(&mut self, path: &Path) -> EditorResult<Node> {
        let node = self.node_at(path)?.clone();
        self.apply(Operation::RemoveNode {
            path: path.clone(),
            node: node.clone(),
        })?;
        Ok(node)
    }

    /// Update type, attributes or marks; a no-op when nothing would change
    pub fn set_node(&mut self, path: &Path, new_properties: NodeProperties) -> EditorResult<()> {
        let properties = new_properties.snapshot(self.node_at(path)?);
        if properties == new_properties {
            return Ok(());
        }
        self.apply(Operation::SetNode {
            path: path.clone(),
            properties,
            new_properties,
        })
    }

    /// Merge the node at `path` into its previous sibling
    pub fn merge_node(&mut self, path: &Path) -> EditorResult<()> {
        let properties = NodeProperties::of(self.node_at(path)?);
        let position = path
            .previous()
            .and_then(|previous| self.document.node(&previous))
            .map(Node::len)
            .ok_or_else(|| OperationError::NoPreviousSibling(path.clone()))?;
        self.apply(Operation::MergeNode {
            path: path.clone(),
            position,
            properties,
        })
    }

    pub fn split_node(&mut self, path: &Path, position: usize) -> EditorResult<()> {
        let properties = NodeProperties::of(self.node_at(path)?);
        self.apply(Operation::SplitNode {
            path: path.clone(),
            position,
            properties,
        })
    }

    pub fn move_node(&mut self, path: &Path, new_path: &Path) -> EditorResult<()> {
        self.apply(Operation::MoveNode {
            path: path.clone(),
            new_path: new_path.clone(),
        })
    }

    /// Wrap children `span` of `parent` into `wrapper`
    pub fn wrap_nodes(
        &mut self,
        parent: &Path,
        span: std::ops::Range<usize>,
        mut wrapper: Element,
    ) -> EditorResult<()> {
        if span.is_empty() {
            return Ok(());
        }
        wrapper.children.clear();
        let wrapper_path = parent.child(span.start);

        self.without_normalizing(|editor| {
            editor.insert_node(&wrapper_path, wrapper)?;
            for index in 0..span.len() {
                editor.move_node(&parent.child(span.start + 1), &wrapper_path.child(index))?;
            }
            Ok(())
        })
    }

    /// Replace the element at `path` with its children
    pub fn unwrap_node(&mut self, path: &Path) -> EditorResult<()> {
        let count = self.document.element(path)?.children.len();
        let (parent, index) = split_path(path)?;

        self.without_normalizing(|editor| {
            for offset in 0..count {
                let target = parent.child(index + offset);
                editor.move_node(&target.child(0), &target)?;
            }
            editor.remove_node(&parent.child(index + count)).map(drop)
        })
    }

    /// Unwrap the closest element of `kind` around the selection anchor
    pub fn unwrap_above(&mut self, kind: &ElementType) -> EditorResult<bool> {
        let Some(anchor) = self.selection.as_ref().map(|range| range.anchor.path.clone()) else {
            return Ok(false);
        };
        let Some((path, _)) = self.document.above(&anchor, |element| element.kind == *kind) else {
            return Ok(false);
        };
        self.unwrap_node(&path)?;
        Ok(true)
    }

    /// Split every node from the leaf at `point` up to and including `top`.
    /// Returns the path of the new right half of `top`.
    pub fn split_up_to(&mut self, point: &Point, top: &Path) -> EditorResult<Path> {
        if !(top == &point.path || top.is_ancestor_of(&point.path)) {
            return Err(EditorError::UnexpectedNode("ancestor", top.clone()));
        }

        self.without_normalizing(|editor| {
            let mut path = point.path.clone();
            let mut position = point.offset;
            loop {
                editor.split_node(&path, position)?;
                let (parent, index) = split_path(&path)?;
                if path == *top {
                    return Ok(parent.child(index + 1));
                }
                position = index + 1;
                path = parent;
            }
        })
    }

    pub fn remove_text(&mut self, path: &Path, offset: usize, len: usize) -> EditorResult<()> {
        let text: String = self.document.leaf(path)?.text.chars().skip(offset).take(len).collect();
        if text.is_empty() {
            return Ok(());
        }
        self.apply(Operation::RemoveText {
            path: path.clone(),
            offset,
            text,
        })
    }

    /// Type `text` at the selection, replacing an expanded selection. Pending
    /// marks go onto a new leaf at the caret.
    pub fn insert_text(&mut self, text: &str) -> EditorResult<()> {
        let Some(selection) = self.selection.clone() else {
            return Ok(());
        };
        if text.is_empty() {
            return Ok(());
        }

        self.without_normalizing(|editor| {
            if selection.is_expanded() {
                editor.delete_fragment()?;
            }
            let Some(point) = editor.selection.as_ref().map(|range| range.anchor.clone()) else {
                return Ok(());
            };
            if editor.document.void_above(&point.path).is_some() {
                debug!(path = %point.path, "Ignoring text typed into a void");
                return Ok(());
            }

            let leaf = editor.document.leaf(&point.path)?;
            let leaf_len = leaf.len();
            match editor.marks.take() {
                Some(marks) if marks != leaf.marks => {
                    let at = if point.offset == 0 {
                        point.path.clone()
                    } else {
                        if point.offset < leaf_len {
                            editor.split_node(&point.path, point.offset)?;
                        }
                        split_path(&point.path).map(|(parent, index)| parent.child(index + 1))?
                    };
                    editor.insert_node(&at, folio_model::Leaf::with_marks(text, marks))?;
                    editor.select(Range::collapsed(Point::new(at, text.chars().count())))
                }
                _ => editor.apply(Operation::InsertText {
                    path: point.path,
                    offset: point.offset,
                    text: text.to_string(),
                }),
            }
        })
    }

    /// Delete the content of an expanded selection, joining its edge blocks
    /// when they end up as siblings of the same kind
    pub fn delete_fragment(&mut self) -> EditorResult<()> {
        let Some(selection) = self.selection.clone() else {
            return Ok(());
        };
        if selection.is_collapsed() {
            return Ok(());
        }
        let (start, end) = (selection.start().clone(), selection.end().clone());

        self.without_normalizing(|editor| {
            if start.path == end.path {
                editor.remove_text(&start.path, start.offset, end.offset - start.offset)?;
                return editor.select(Range::collapsed(start.clone()));
            }

            let start_block = editor.document.text_block_above(&start.path).map(|(path, _)| path);
            let end_block = editor.document.text_block_above(&end.path).map(|(path, _)| path);
            let between = nodes_between(editor, &start.path, &end.path);

            editor.remove_text(&end.path, 0, end.offset)?;
            let start_len = editor.document.leaf(&start.path)?.len();
            editor.remove_text(&start.path, start.offset, start_len.saturating_sub(start.offset))?;

            let since = editor.operations.len();
            for path in between.iter().rev() {
                editor.remove_node(path)?;
            }

            if let (Some(start_block), Some(end_block)) = (start_block, end_block) {
                let end_block = editor.rebase_path(&end_block, since);
                let mergeable = end_block.as_ref().is_some_and(|end_block| {
                    start_block.is_sibling_of(end_block)
                        && start_block.next().as_ref() == Some(end_block)
                        && editor.document.type_at(&start_block) == editor.document.type_at(end_block)
                });
                if let (true, Some(end_block)) = (mergeable, end_block) {
                    editor.merge_node(&end_block)?;
                }
            }

            editor.select(Range::collapsed(start.clone()))
        })
    }

    /// Backspace with a collapsed selection
    pub fn delete_backward(&mut self) -> EditorResult<()> {
        let Some(selection) = self.selection.clone() else {
            return Ok(());
        };
        if selection.is_expanded() {
            return self.delete_fragment();
        }
        let point = selection.anchor;

        if let Some((void_path, _)) = self.document.void_above(&point.path) {
            let target = self.block_of_void(&void_path);
            debug!(path = %target, "Removing selected void");
            return self.remove_node(&target).map(drop);
        }

        if point.offset > 0 {
            return self.remove_text(&point.path, point.offset - 1, 1);
        }

        let Some((block_path, block)) = self.document.text_block_above(&point.path) else {
            return Ok(());
        };
        let block_kind = block.kind.clone();
        let block_is_empty = is_empty_text_block(block);

        let earlier: Vec<(Path, usize)> = self
            .document
            .descendants_of(&block_path)
            .filter_map(|(path, node)| node.as_leaf().map(|leaf| (path, leaf.len())))
            .filter(|(path, _)| path.is_before(&point.path))
            .collect();
        for (path, len) in earlier.into_iter().rev() {
            if let Some((void_path, _)) = self.document.void_above(&path) {
                return self.remove_node(&void_path).map(drop);
            }
            if len > 0 {
                return self.remove_text(&path, len - 1, 1);
            }
        }

        // At the start of the block
        if block_kind == ElementType::Caption {
            return Ok(());
        }
        let Some(previous_path) = block_path.previous() else {
            return Ok(());
        };
        let Some(previous) = self.document.node(&previous_path) else {
            return Ok(());
        };

        if previous.is_type(&block_kind) {
            return self.merge_node(&block_path);
        }

        let target = self.document.end_of(&previous_path);
        self.without_normalizing(|editor| {
            if block_is_empty {
                editor.remove_node(&block_path)?;
            }
            match target {
                Some(point) => editor.select(Range::collapsed(point)),
                None => Ok(()),
            }
        })
    }

    /// Enter: split the current text block at the caret
    pub fn insert_break(&mut self) -> EditorResult<()> {
        let Some(selection) = self.selection.clone() else {
            return Ok(());
        };

        self.without_normalizing(|editor| {
            if selection.is_expanded() {
                editor.delete_fragment()?;
            }
            let Some(point) = editor.selection.as_ref().map(|range| range.anchor.clone()) else {
                return Ok(());
            };

            if let Some((void_path, void)) = editor.document.void_above(&point.path) {
                if void.is_inline() {
                    return Ok(());
                }
                let block = editor.block_of_void(&void_path);
                return editor.insert_paragraph_after(&block);
            }

            let Some((block_path, block)) = editor.document.text_block_above(&point.path) else {
                return Ok(());
            };
            if block.kind == ElementType::Caption {
                let (composite, _) = split_path(&block_path)?;
                return editor.insert_paragraph_after(&composite);
            }

            editor.split_up_to(&point, &block_path).map(drop)
        })
    }

    /// Insert a block element at the caret. An empty paragraph at the caret is
    /// replaced; otherwise the block goes after the current block. Returns the
    /// block's path once normalized.
    pub fn insert_block(&mut self, element: Element) -> EditorResult<Path> {
        let (at, since) = self.without_normalizing(|editor| {
            if editor.selection.as_ref().is_some_and(Range::is_expanded) {
                editor.delete_fragment()?;
            }
            let anchor = editor.selection.as_ref().map(|range| range.anchor.path.clone());
            let (at, replace) = match anchor {
                Some(anchor) => editor.block_insertion_point(&anchor)?,
                None => (Path::root().child(editor.document.children.len()), false),
            };

            if replace {
                editor.remove_node(&at)?;
            }
            editor.insert_node(&at, element)?;

            let (parent, index) = split_path(&at)?;
            let is_last = editor
                .document
                .children_at(&parent)
                .is_some_and(|children| children.len() == index + 1);
            if is_last {
                editor.insert_node(&parent.child(index + 1), Element::paragraph(""))?;
            }

            if let Some(start) = editor.document.start_of(&at) {
                editor.select(Range::collapsed(start))?;
            }
            Ok((at, editor.operations.len()))
        })?;

        self.rebase_path(&at, since)
            .ok_or(EditorError::UnexpectedNode("inserted block", at))
    }

    /// Insert an inline element at the caret, if the enclosing element allows it.
    /// The caret ends up right after the inline.
    pub fn insert_inline(&mut self, element: Element) -> EditorResult<Option<Path>> {
        let Some(selection) = self.selection.clone() else {
            return Ok(None);
        };
        if !self.accepts_inline_at(&selection.start().path, &element.kind) {
            return Ok(None);
        }

        let inserted = self.without_normalizing(|editor| {
            if selection.is_expanded() {
                editor.delete_fragment()?;
            }
            let Some(point) = editor.selection.as_ref().map(|range| range.anchor.clone()) else {
                return Ok(None);
            };

            let leaf_len = editor.document.leaf(&point.path)?.len();
            let at = if point.offset == 0 {
                point.path.clone()
            } else {
                if point.offset < leaf_len {
                    editor.split_node(&point.path, point.offset)?;
                }
                split_path(&point.path).map(|(parent, index)| parent.child(index + 1))?
            };
            editor.insert_node(&at, element)?;
            Ok(Some((at, editor.operations.len())))
        })?;

        let Some((at, since)) = inserted else {
            return Ok(None);
        };
        let Some(path) = self.rebase_path(&at, since) else {
            return Ok(None);
        };
        let after = split_path(&path)
            .ok()
            .and_then(|(parent, index)| self.document.start_of(&parent.child(index + 1)));
        if let Some(after) = after {
            self.select(Range::collapsed(after))?;
        }
        Ok(Some(path))
    }

    /// Wrap an expanded selection inside a single text block into an inline
    /// element. Returns `None` when the selection spans blocks, crosses other
    /// inline elements, or the block does not accept the inline.
    pub fn wrap_inline(&mut self, element: Element) -> EditorResult<Option<Path>> {
        let Some(selection) = self.selection.clone() else {
            return Ok(None);
        };
        if selection.is_collapsed() {
            return Ok(None);
        }
        let (start, end) = (selection.start().clone(), selection.end().clone());

        let (Some((start_parent, start_index)), Some((end_parent, end_index))) =
            (split_path(&start.path).ok(), split_path(&end.path).ok())
        else {
            return Ok(None);
        };
        if start_parent != end_parent || !self.accepts_inline_at(&start.path, &element.kind) {
            return Ok(None);
        }
        let crosses_inline = self
            .document
            .children_at(&start_parent)
            .and_then(|children| children.get(start_index..=end_index))
            .map_or(true, |span| span.iter().any(|node| !node.is_leaf()));
        if crosses_inline {
            debug!(kind = %element.kind, "Selection crosses an inline element; not wrapping");
            return Ok(None);
        }

        let start_len = self.document.leaf(&start.path)?.len();
        let end_len = self.document.leaf(&end.path)?.len();

        let wrapped = self.without_normalizing(|editor| {
            let mut last = end_index;
            if end.offset == 0 {
                last -= 1;
            } else if end.offset < end_len {
                editor.split_node(&end.path, end.offset)?;
            }

            let mut first = start_index;
            if start.offset > 0 {
                if start.offset < start_len {
                    editor.split_node(&start.path, start.offset)?;
                    last += 1;
                }
                first += 1;
            }

            editor.wrap_nodes(&start_parent, first..last + 1, element)?;
            Ok((start_parent.child(first), editor.operations.len()))
        })?;

        let (at, since) = wrapped;
        let Some(path) = self.rebase_path(&at, since) else {
            return Ok(None);
        };
        if let Some(range) = self.document.range_of(&path) {
            self.select(range)?;
        }
        Ok(Some(path))
    }

    pub fn select(&mut self, range: Range) -> EditorResult<()> {
        for point in [&range.anchor, &range.focus] {
            if !self.document.contains_point(point) {
                return Err(EditorError::UnexpectedNode("point", point.path.clone()));
            }
        }
        self.set_selection(Some(range))
    }

    pub fn set_selection(&mut self, selection: Option<Range>) -> EditorResult<()> {
        if self.selection == selection {
            return Ok(());
        }
        self.apply(Operation::SetSelection {
            selection: self.selection.clone(),
            new_selection: selection,
        })
    }

    pub fn deselect(&mut self) -> EditorResult<()> {
        self.set_selection(None)
    }

    /// Text covered by the selection
    pub fn selected_text(&self) -> String {
        let Some(range) = &self.selection else {
            return String::new();
        };
        let (start, end) = range.edges();
        self.document
            .leaf_paths_between(start, end)
            .iter()
            .filter_map(|path| Some((path, self.document.leaf(path).ok()?)))
            .map(|(path, leaf)| {
                let from = if *path == start.path { start.offset } else { 0 };
                let to = if *path == end.path { end.offset } else { leaf.len() };
                leaf.text.chars().skip(from).take(to.saturating_sub(from)).collect::<String>()
            })
            .collect()
    }

    fn node_at(&self, path: &Path) -> EditorResult<&Node> {
        self.document
            .node(path)
            .ok_or_else(|| OperationError::NodeNotFound(path.clone()).into())
    }

    /// Whether the element holding the leaf at `leaf_path` accepts an inline of `kind`
    fn accepts_inline_at(&self, leaf_path: &Path, kind: &ElementType) -> bool {
        if self.document.void_above(leaf_path).is_some() {
            return false;
        }
        let Some(parent) = leaf_path.parent().filter(|parent| !parent.is_root()) else {
            return false;
        };
        match self.document.element(&parent) {
            Ok(element) if element.kind.accepts_inline(kind) => true,
            Ok(element) => {
                debug!(kind = %kind, parent = %element.kind, "Inline not allowed here");
                false
            }
            Err(_) => false,
        }
    }

    /// The block that owns a void: its composite wrapper if it has one
    pub(crate) fn block_of_void(&self, void_path: &Path) -> Path {
        match void_path.parent() {
            Some(parent)
                if self
                    .document
                    .type_at(&parent)
                    .is_some_and(ElementType::is_composite) =>
            {
                parent
            }
            _ => void_path.clone(),
        }
    }

    /// Where a block inserted at the caret in `leaf_path` goes, and whether it
    /// replaces the node there
    fn block_insertion_point(&self, leaf_path: &Path) -> EditorResult<(Path, bool)> {
        if let Some((void_path, _)) = self.document.void_above(leaf_path) {
            let block = self.block_of_void(&void_path);
            let (parent, index) = split_path(&block)?;
            return Ok((parent.child(index + 1), false));
        }

        let Some((block_path, block)) = self.document.text_block_above(leaf_path) else {
            return Ok((Path::root().child(self.document.children.len()), false));
        };
        if block.kind == ElementType::Caption {
            let (composite, _) = split_path(&block_path)?;
            let (parent, index) = split_path(&composite)?;
            return Ok((parent.child(index + 1), false));
        }
        if block.kind == ElementType::Paragraph && is_empty_text_block(block) {
            return Ok((block_path, true));
        }
        let (parent, index) = split_path(&block_path)?;
        Ok((parent.child(index + 1), false))
    }

    fn insert_paragraph_after(&mut self, path: &Path) -> EditorResult<()> {
        let (parent, index) = split_path(path)?;
        let next = parent.child(index + 1);
        self.insert_node(&next, Element::paragraph(""))?;
        self.select(Range::collapsed(Point::new(next.child(0), 0)))
    }
}

/// Parent path and index; the root has neither
pub(crate) fn split_path(path: &Path) -> EditorResult<(Path, usize)> {
    match (path.parent(), path.index()) {
        (Some(parent), Some(index)) => Ok((parent, index)),
        _ => Err(OperationError::RootPath.into()),
    }
}

/// A text block holding nothing but empty leaves
pub(crate) fn is_empty_text_block(element: &Element) -> bool {
    element
        .children
        .iter()
        .all(|child| matches!(child, Node::Leaf(leaf) if leaf.is_empty()))
}

/// The largest subtrees strictly between two leaves, in document order
fn nodes_between(editor: &Editor, start: &Path, end: &Path) -> Vec<Path> {
    let mut between: Vec<Path> = Vec::new();
    for (path, _) in editor.document.descendants() {
        if !path.is_after(start) || !path.is_before(end) {
            continue;
        }
        if between.last().is_some_and(|last| last.is_ancestor_of(&path)) {
            continue;
        }
        between.push(path);
    }
    between
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::{Document, Leaf, Mark, Marks};

    fn editor_with(children: Vec<Node>) -> Editor {
        Editor::new(Document::new(children)).unwrap()
    }

    fn paragraphs(texts: &[&str]) -> Vec<Node> {
        texts.iter().map(|text| Node::Element(Element::paragraph(*text))).collect()
    }

    fn strings(editor: &Editor) -> Vec<String> {
        editor.document().children.iter().map(Node::string).collect()
    }

    #[test]
    fn test_insert_break_splits_paragraph() {
        let mut editor = editor_with(paragraphs(&["hello"]));
        editor.select(Range::collapsed(Point::new([0, 0], 2))).unwrap();
        editor.insert_break().unwrap();

        assert_eq!(strings(&editor), vec!["he", "llo"]);
        assert_eq!(editor.selection(), Some(&Range::collapsed(Point::new([1, 0], 0))));
    }

    #[test]
    fn test_delete_backward_merges_paragraphs() {
        let mut editor = editor_with(paragraphs(&["one", "two"]));
        editor.select(Range::collapsed(Point::new([1, 0], 0))).unwrap();
        editor.delete_backward().unwrap();

        assert_eq!(strings(&editor), vec!["onetwo"]);
        assert_eq!(editor.selection(), Some(&Range::collapsed(Point::new([0, 0], 3))));
    }

    #[test]
    fn test_delete_backward_after_void_removes_empty_paragraph() {
        let equation = Element::void(ElementType::Equation).with_attr("latex", "x^2");
        let mut editor = editor_with(vec![Node::Element(equation), Node::Element(Element::paragraph(""))]);
        editor.select(Range::collapsed(Point::new([1, 0], 0))).unwrap();
        editor.delete_backward().unwrap();

        assert_eq!(editor.document().children.len(), 1);
        assert_eq!(editor.document().type_at(&Path::from([0])), Some(&ElementType::Equation));
        assert_eq!(editor.selection(), Some(&Range::collapsed(Point::new([0, 0], 0))));
    }

    #[test]
    fn test_delete_fragment_across_paragraphs() {
        let mut editor = editor_with(paragraphs(&["abc", "middle", "xyz"]));
        editor
            .select(Range::new(Point::new([0, 0], 1), Point::new([2, 0], 2)))
            .unwrap();
        editor.delete_fragment().unwrap();

        assert_eq!(strings(&editor), vec!["az"]);
        assert_eq!(editor.selection(), Some(&Range::collapsed(Point::new([0, 0], 1))));
    }

    #[test]
    fn test_insert_block_replaces_empty_paragraph() {
        let mut editor = editor_with(paragraphs(&["intro", ""]));
        editor.select(Range::collapsed(Point::new([1, 0], 0))).unwrap();
        let path = editor
            .insert_block(Element::void(ElementType::Equation).with_attr("latex", "e"))
            .unwrap();

        assert_eq!(path, Path::from([1]));
        assert_eq!(editor.document().type_at(&Path::from([1])), Some(&ElementType::Equation));
        // a trailing paragraph keeps the document typeable
        assert_eq!(editor.document().type_at(&Path::from([2])), Some(&ElementType::Paragraph));
        assert_eq!(editor.document().children.len(), 3);
    }

    #[test]
    fn test_insert_block_goes_after_non_empty_paragraph() {
        let mut editor = editor_with(paragraphs(&["intro", "outro"]));
        editor.select(Range::collapsed(Point::new([0, 0], 2))).unwrap();
        let path = editor
            .insert_block(Element::void(ElementType::Equation).with_attr("latex", "e"))
            .unwrap();

        assert_eq!(path, Path::from([1]));
        assert_eq!(strings(&editor)[0], "intro");
        assert_eq!(strings(&editor)[2], "outro");
    }

    #[test]
    fn test_insert_inline_respects_allow_list() {
        let caption = Element::caption();
        let image_block = Element::new(
            ElementType::ImageBlock,
            vec![Node::Element(Element::void(ElementType::Image)), Node::Element(caption)],
        );
        let mut editor = editor_with(vec![Node::Element(image_block)]);
        editor.select(Range::collapsed(Point::new([0, 1, 0], 0))).unwrap();

        let reference = Element::void(ElementType::Reference).with_attr("refId", "r1");
        assert_eq!(editor.insert_inline(reference).unwrap(), None);
        assert!(find_type(&editor, &ElementType::Reference).is_none());
    }

    #[test]
    fn test_insert_inline_in_paragraph_gets_spacers() {
        let mut editor = editor_with(paragraphs(&["ab"]));
        editor.select(Range::collapsed(Point::new([0, 0], 1))).unwrap();
        let reference = Element::void(ElementType::Reference).with_attr("refId", "r1");
        let path = editor.insert_inline(reference).unwrap().unwrap();

        assert_eq!(path, Path::from([0, 1]));
        let paragraph = editor.document().element(&Path::from([0])).unwrap();
        assert_eq!(paragraph.children.len(), 3);
        assert_eq!(editor.selection(), Some(&Range::collapsed(Point::new([0, 2], 0))));
    }

    #[test]
    fn test_wrap_inline_link() {
        let mut editor = editor_with(paragraphs(&["see docs here"]));
        editor
            .select(Range::new(Point::new([0, 0], 4), Point::new([0, 0], 8)))
            .unwrap();
        let link = Element::new(ElementType::Link, Vec::new()).with_attr("url", "https://x.test");
        let path = editor.wrap_inline(link).unwrap().unwrap();

        assert_eq!(path, Path::from([0, 1]));
        let link = editor.document().element(&path).unwrap();
        assert_eq!(link.url(), Some("https://x.test"));
        assert_eq!(editor.document().node(&path).unwrap().string(), "docs");
        assert_eq!(editor.document().children[0].string(), "see docs here");
    }

    #[test]
    fn test_pending_marks_apply_to_typed_text() {
        let mut editor = editor_with(paragraphs(&["ab"]));
        editor.select(Range::collapsed(Point::new([0, 0], 1))).unwrap();
        editor.set_pending_marks(Some(Marks::none().with(Mark::Bold)));
        editor.insert_text("X").unwrap();

        let paragraph = editor.document().element(&Path::from([0])).unwrap();
        let bold: Vec<&Leaf> = paragraph
            .children
            .iter()
            .filter_map(Node::as_leaf)
            .filter(|leaf| leaf.marks.has(Mark::Bold))
            .collect();
        assert_eq!(bold.len(), 1);
        assert_eq!(bold[0].text, "X");
        assert_eq!(editor.document().children[0].string(), "aXb");
    }

    #[test]
    fn test_unwrap_node_lifts_children() {
        let list = Node::element(
            ElementType::BulletedList,
            vec![Node::element(ElementType::ListItem, paragraphs(&["a", "b"]))],
        );
        let mut editor = editor_with(vec![list]);
        editor.unwrap_node(&Path::from([0, 0])).unwrap();
        editor.unwrap_node(&Path::from([0])).unwrap();

        assert_eq!(strings(&editor), vec!["a", "b"]);
    }

    fn find_type(editor: &Editor, kind: &ElementType) -> Option<Path> {
        editor
            .document()
            .descendants()
            .find(|(_, node)| node.is_type(kind))
            .map(|(path, _)| path)
    }
}

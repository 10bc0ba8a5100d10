//! # Editor
//!
//! The editor owns the document tree, the selection and the pending marks.
//! Every change goes through [`Editor::apply`], which:
//!
//! 1. computes the paths the operation may invalidate,
//! 2. applies it to the document,
//! 3. carries the existing dirty paths and the selection across it,
//! 4. logs it for the next [`Editor::flush`],
//! 5. normalizes, unless a [`Editor::without_normalizing`] block is open.
//!
//! `flush` ends a transaction: plugins observe the operations applied since
//! the previous flush, then the side-channel command queues drain.

use std::rc::Rc;

use folio_common::strip_transient_attrs;
use folio_model::{Affinity, Document, Marks, Path, Range, TreeChange};
use serde_json::Value;
use tracing::{debug, trace};

use crate::context::RichContext;
use crate::keys::{KeyEvent, Platform};
use crate::marks::toggle_mark;
use crate::operations::{rebase_path, Operation};
use crate::plugin::{PluginRegistry, PluginStack};
use crate::plugins::{equations, lists, links, references, shortcuts, subsections, tables};
use crate::side_channel::{EditorId, Modals, OverlayRegistry};
use crate::toolbar::{shortcut_listing, Shortcut, ToolbarAction, ToolbarItem};
use crate::{EditorConfig, EditorError, EditorResult};

pub struct Editor {
    id: EditorId,
    pub(crate) document: Document,
    pub(crate) selection: Option<Range>,
    /// Marks applied to the next inserted text; cleared when the selection moves
    pub(crate) marks: Option<Marks>,
    focused: bool,
    pub(crate) operations: Vec<Operation>,
    pub(crate) dirty_paths: Vec<Path>,
    suspend_depth: usize,
    pub(crate) normalizing: bool,
    pub(crate) registry: Rc<PluginRegistry>,
    pub(crate) config: EditorConfig,
    modals: Modals,
    overlays: OverlayRegistry,
    context: Option<RichContext>,
}

impl Editor {
    /// Editor with every standard plugin and its own overlay registry
    pub fn new(document: Document) -> EditorResult<Self> {
        Self::assemble(
            document,
            PluginStack::standard(),
            EditorConfig::default(),
            &OverlayRegistry::new(),
        )
    }

    /// Build an editor from an ordered plugin stack; later plugins take precedence.
    /// The document is fully normalized before this returns.
    pub fn assemble(
        document: Document,
        stack: PluginStack,
        config: EditorConfig,
        overlays: &OverlayRegistry,
    ) -> EditorResult<Self> {
        let registry = PluginRegistry::build(&stack);
        let mut modals = Modals::default();
        registry.attach(&mut modals);

        let mut editor = Editor {
            id: overlays.register_editor(),
            document,
            selection: None,
            marks: None,
            focused: false,
            operations: Vec::new(),
            dirty_paths: Vec::new(),
            suspend_depth: 0,
            normalizing: false,
            registry: Rc::new(registry),
            config,
            modals,
            overlays: overlays.clone(),
            context: None,
        };

        debug!(editor = %editor.id, plugins = ?stack.names(), "Assembled editor");
        editor.normalize(true)?;
        Ok(editor)
    }

    pub fn with_context(mut self, context: RichContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn set_context(&mut self, context: Option<RichContext>) {
        self.context = context;
    }

    pub fn id(&self) -> EditorId {
        self.id
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Hand the document out, leaving a fresh one behind
    pub fn take_document(&mut self) -> Document {
        self.selection = None;
        std::mem::take(&mut self.document)
    }

    pub fn selection(&self) -> Option<&Range> {
        self.selection.as_ref()
    }

    pub fn marks(&self) -> Option<Marks> {
        self.marks
    }

    pub(crate) fn set_pending_marks(&mut self, marks: Option<Marks>) {
        self.marks = marks;
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_read_only(&self) -> bool {
        self.config.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.config.read_only = read_only;
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn toolbar(&self) -> &[ToolbarItem] {
        self.registry.toolbar()
    }

    /// Keyboard shortcut help, derived from the toolbar
    pub fn shortcuts(&self, platform: Platform) -> Vec<Shortcut> {
        shortcut_listing(self.registry.toolbar(), platform)
    }

    pub fn modals(&self) -> &Modals {
        &self.modals
    }

    pub fn modals_mut(&mut self) -> &mut Modals {
        &mut self.modals
    }

    pub fn overlays(&self) -> &OverlayRegistry {
        &self.overlays
    }

    pub fn context(&self) -> Option<&RichContext> {
        self.context.as_ref()
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Operations applied since the last flush
    pub fn pending_operations(&self) -> &[Operation] {
        &self.operations
    }

    /// The stored form of the document: transient attributes stripped
    pub fn to_value(&self) -> EditorResult<Value> {
        let mut children = self.document.children.clone();
        strip_transient_attrs(&mut children);
        Ok(Document::new(children).to_value()?)
    }

    pub fn apply(&mut self, operation: Operation) -> EditorResult<()> {
        if operation.is_document_change() && self.config.read_only && !self.normalizing {
            return Err(EditorError::ReadOnly);
        }

        let dirty = operation.dirty_paths();
        operation.apply(&mut self.document)?;

        if let Some(change) = operation.change() {
            let mut carried: Vec<Path> = self
                .dirty_paths
                .drain(..)
                .filter_map(|path| path.transform(&change, Affinity::Forward))
                .collect();
            for path in dirty {
                if !carried.contains(&path) {
                    carried.push(path);
                }
            }
            self.dirty_paths = carried;
            self.transform_selection(&change);
        } else {
            for path in dirty {
                if !self.dirty_paths.contains(&path) {
                    self.dirty_paths.push(path);
                }
            }
        }

        if let Operation::SetSelection { new_selection, .. } = &operation {
            if self.selection != *new_selection {
                self.marks = None;
            }
            self.selection = new_selection.clone();
        }

        trace!(operation = ?operation, "Applied operation");
        self.operations.push(operation);

        if self.suspend_depth == 0 {
            self.normalize(false)?;
        }
        Ok(())
    }

    fn transform_selection(&mut self, change: &TreeChange) {
        let Some(range) = self.selection.take() else {
            return;
        };
        self.selection = range.transform(change).or_else(|| {
            let near = match change {
                TreeChange::RemoveNode { path } | TreeChange::SplitNode { path, .. } => path,
                _ => return None,
            };
            self.document.point_near(near).map(Range::collapsed)
        });
    }

    /// Run `f` with normalization suspended; normalizes once the outermost block ends
    pub fn without_normalizing<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> EditorResult<T>,
    ) -> EditorResult<T> {
        self.suspend_depth += 1;
        let result = f(self);
        self.suspend_depth -= 1;
        if self.suspend_depth == 0 {
            self.normalize(false)?;
        }
        result
    }

    /// Carry a path across every operation applied since `since` (an index into the
    /// pending operation log)
    pub fn rebase_path(&self, path: &Path, since: usize) -> Option<Path> {
        match self.operations.get(since..) {
            Some(operations) => rebase_path(path, operations),
            None => Some(path.clone()),
        }
    }

    /// End the transaction: notify plugins, then drain the side channels
    pub fn flush(&mut self) -> Vec<Operation> {
        let operations = std::mem::take(&mut self.operations);

        let registry = self.registry.clone();
        for plugin in registry.plugins() {
            plugin.on_change(self, &operations);
        }

        self.modals.drain(&self.overlays, self.id);
        if self.modals.visible().is_some() && !self.overlays.owns(self.id) {
            debug!(editor = %self.id, "Another editor owns the overlay; closing ours");
            self.modals.close_all();
        }

        operations
    }

    /// Offer the key to every plugin in registration order until one prevents
    /// the default, then fall back to text input
    pub fn handle_key_down(&mut self, event: &mut KeyEvent) -> EditorResult<()> {
        if self.config.read_only {
            return Ok(());
        }

        let registry = self.registry.clone();
        for plugin in registry.plugins() {
            if event.is_default_prevented() {
                break;
            }
            plugin.on_key_down(event, self)?;
        }
        if event.is_default_prevented() {
            return Ok(());
        }

        match event.key.as_str() {
            "Enter" if event.shift => {
                event.prevent_default();
                self.insert_text("\n")
            }
            "Enter" if !event.is_mod() => {
                event.prevent_default();
                self.insert_break()
            }
            "Backspace" if !event.is_mod() => {
                event.prevent_default();
                self.delete_backward()
            }
            _ if event.is_printable() => {
                event.prevent_default();
                self.insert_text(&event.key)
            }
            _ => Ok(()),
        }
    }

    pub fn run_action(&mut self, action: &ToolbarAction) -> EditorResult<()> {
        if self.config.read_only {
            return Err(EditorError::ReadOnly);
        }

        match action {
            ToolbarAction::ToggleMark { mark, exclusive } => toggle_mark(self, *mark, exclusive).map(drop),
            ToolbarAction::ToggleList(kind) => lists::toggle_list(self, kind),
            ToolbarAction::InsertTable { rows, columns } => {
                tables::insert_table(self, *rows, *columns).map(drop)
            }
            ToolbarAction::InsertSubSection => subsections::insert_subsection(self).map(drop),
            ToolbarAction::ShowLink => links::show_link_modal(self).map(drop),
            ToolbarAction::ShowEquation { inline } => {
                equations::show_equation_modal(self, *inline).map(drop)
            }
            ToolbarAction::ShowReference => references::show_reference_modal(self).map(drop),
            ToolbarAction::ShowShortcuts => shortcuts::show_shortcuts(self).map(drop),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::{Element, ElementType, Leaf, Node, Point};

    fn editor_with(children: Vec<Node>) -> Editor {
        Editor::new(Document::new(children)).unwrap()
    }

    #[test]
    fn test_assemble_normalizes() {
        let editor = editor_with(vec![Node::text("bare")]);
        assert_eq!(editor.document().type_at(&Path::from([0])), Some(&ElementType::Paragraph));
        assert_eq!(editor.document().children.len(), 1);
    }

    #[test]
    fn test_selection_follows_inserted_text() {
        let mut editor = editor_with(vec![Node::Element(Element::paragraph("ac"))]);
        editor.select(Range::collapsed(Point::new([0, 0], 1))).unwrap();
        editor.insert_text("b").unwrap();

        assert_eq!(editor.document().children[0].string(), "abc");
        assert_eq!(editor.selection(), Some(&Range::collapsed(Point::new([0, 0], 2))));
    }

    #[test]
    fn test_read_only_rejects_changes() {
        let mut editor = editor_with(vec![Node::Element(Element::paragraph("x"))]);
        editor.set_read_only(true);
        let result = editor.insert_node(&Path::from([1]), Element::paragraph("y"));
        assert!(matches!(result, Err(EditorError::ReadOnly)));
        assert_eq!(editor.document().children.len(), 1);
    }

    #[test]
    fn test_without_normalizing_defers_fixes() {
        let mut editor = editor_with(vec![Node::Element(Element::paragraph("x"))]);
        editor
            .without_normalizing(|editor| {
                editor.insert_node(&Path::from([1]), Leaf::new("loose"))?;
                assert!(editor.document().children[1].is_leaf());
                Ok(())
            })
            .unwrap();
        assert_eq!(editor.document().type_at(&Path::from([1])), Some(&ElementType::Paragraph));
    }

    #[test]
    fn test_flush_returns_and_clears_operations() {
        let mut editor = editor_with(vec![Node::Element(Element::paragraph("x"))]);
        editor.select(Range::collapsed(Point::new([0, 0], 1))).unwrap();
        editor.insert_text("y").unwrap();
        let operations = editor.flush();
        assert!(operations.iter().any(|op| matches!(op, Operation::InsertText { .. })));
        assert!(editor.pending_operations().is_empty());
    }

    #[test]
    fn test_removing_selected_block_moves_caret_nearby() {
        let mut editor = editor_with(vec![
            Node::Element(Element::paragraph("one")),
            Node::Element(Element::paragraph("two")),
        ]);
        editor.select(Range::collapsed(Point::new([1, 0], 2))).unwrap();
        editor.remove_node(&Path::from([1])).unwrap();
        assert_eq!(editor.selection(), Some(&Range::collapsed(Point::new([0, 0], 3))));
    }
}

//! # Normalization Engine
//!
//! Every operation marks the paths it may have invalidated as dirty. Once the
//! outermost transform finishes, the editor repeatedly takes the deepest dirty
//! path and asks the registered normalizers to inspect it:
//!
//! ```text
//! dirty paths ──pop deepest──► NodeRef ──► normalizer chain ──► Fix?
//!      ▲                                    (last registered       │
//!      └──────── dirty paths of the fix ◄── runs first)  ◄─────────┘
//! ```
//!
//! A normalizer only reads the tree. When it finds a violation it requests a
//! single [`Fix`] and reports the path as handled, which stops the chain for
//! that path. The fix is applied as ordinary operations, so it marks new paths
//! dirty and the loop continues until nothing is left.
//!
//! The loop is bounded: a run may take at most
//! `initial dirty paths × max_normalize_iterations_per_path` passes. Running
//! out means two normalizers keep undoing each other.

use folio_model::{Document, Element, ElementType, Leaf, Node, Path};
use tracing::{debug, error, trace, warn};

use crate::operations::NodeProperties;
use crate::plugin::PluginStack;
use crate::side_channel::OverlayRegistry;
use crate::{Editor, EditorConfig, EditorResult};

/// The node a normalizer is asked about
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Root(&'a Document),
    Element(&'a Element),
    Leaf(&'a Leaf),
}

impl<'a> NodeRef<'a> {
    pub fn at(document: &'a Document, path: &Path) -> Option<Self> {
        if path.is_root() {
            return Some(NodeRef::Root(document));
        }
        Some(match document.node(path)? {
            Node::Element(element) => NodeRef::Element(element),
            Node::Leaf(leaf) => NodeRef::Leaf(leaf),
        })
    }

    pub fn children(&self) -> &'a [Node] {
        match self {
            NodeRef::Root(document) => &document.children,
            NodeRef::Element(element) => &element.children,
            NodeRef::Leaf(_) => &[],
        }
    }

    pub fn element(&self) -> Option<&'a Element> {
        match self {
            NodeRef::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Element type; `None` for the root and leaves
    pub fn kind(&self) -> Option<&'a ElementType> {
        self.element().map(|element| &element.kind)
    }

    pub fn is_root(&self) -> bool {
        matches!(self, NodeRef::Root(_))
    }

    /// Whether this node holds blocks rather than inline content
    pub fn holds_blocks(&self) -> bool {
        match self {
            NodeRef::Root(_) => true,
            NodeRef::Element(element) => element.kind.is_block_container(),
            NodeRef::Leaf(_) => false,
        }
    }
}

/// One deferred repair, applied after the normalizer returns
#[derive(Debug, Clone, PartialEq)]
pub enum Fix {
    InsertNode { path: Path, node: Node },
    RemoveNode { path: Path },
    SetNode { path: Path, properties: NodeProperties },
    /// Merge the node into its previous sibling
    MergeNode { path: Path },
    /// Wrap children `start..end` of `parent` into `wrapper`; its own children are discarded
    WrapNodes {
        parent: Path,
        start: usize,
        end: usize,
        wrapper: Element,
    },
    /// Replace the element with its children
    UnwrapNode { path: Path },
}

impl Fix {
    pub fn path(&self) -> &Path {
        match self {
            Fix::InsertNode { path, .. }
            | Fix::RemoveNode { path }
            | Fix::SetNode { path, .. }
            | Fix::MergeNode { path }
            | Fix::UnwrapNode { path } => path,
            Fix::WrapNodes { parent, .. } => parent,
        }
    }
}

/// Read-only view of the document plus the slot for this pass's fix
pub struct NormalizeContext<'a> {
    document: &'a Document,
    fix: Option<Fix>,
}

impl<'a> NormalizeContext<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            fix: None,
        }
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    /// Request the repair for this pass. Always returns `true` so a normalizer
    /// can `return cx.fix(..)` to report the path as handled.
    pub fn fix(&mut self, fix: Fix) -> bool {
        match &self.fix {
            Some(existing) => {
                warn!(kept = ?existing, dropped = ?fix, "Only one fix per pass; dropping the second");
            }
            None => self.fix = Some(fix),
        }
        true
    }

    pub fn has_fix(&self) -> bool {
        self.fix.is_some()
    }

    pub fn into_fix(self) -> Option<Fix> {
        self.fix
    }
}

/// Inspects one node and requests at most one fix for it
pub trait Normalizer {
    fn name(&self) -> &'static str;

    /// Return `true` when the path is handled and later normalizers must not see it
    fn normalize(&self, entry: NodeRef<'_>, path: &Path, cx: &mut NormalizeContext<'_>) -> bool;
}

/// Shared rule for composite blocks (image-block, table-block): the expected
/// content element first, then exactly one caption
pub fn normalize_composite(element: &Element, path: &Path, cx: &mut NormalizeContext<'_>) -> bool {
    let Some(content) = element.kind.composite_content() else {
        return false;
    };
    let children = &element.children;

    if !children.first().is_some_and(|first| first.is_type(&content)) {
        debug!(path = %path, kind = %element.kind, "Removing composite block without its content");
        return cx.fix(Fix::RemoveNode { path: path.clone() });
    }

    if children.len() > 2 {
        return cx.fix(Fix::RemoveNode {
            path: path.child(children.len() - 1),
        });
    }

    match children.get(1) {
        None => cx.fix(Fix::InsertNode {
            path: path.child(1),
            node: Node::Element(Element::caption()),
        }),
        Some(Node::Element(second)) if second.kind == ElementType::Caption => false,
        Some(Node::Element(second)) if second.kind.is_text_block() => cx.fix(Fix::SetNode {
            path: path.child(1),
            properties: NodeProperties::kind(ElementType::Caption),
        }),
        Some(_) => cx.fix(Fix::RemoveNode { path: path.child(1) }),
    }
}

impl Editor {
    /// Drain the dirty paths. `force` marks the whole document dirty first.
    pub fn normalize(&mut self, force: bool) -> EditorResult<()> {
        if self.normalizing {
            return Ok(());
        }

        if force {
            self.dirty_paths = self
                .document
                .descendants()
                .map(|(path, _)| path)
                .chain(std::iter::once(Path::root()))
                .collect();
        }

        if self.dirty_paths.is_empty() {
            return Ok(());
        }

        self.normalizing = true;
        let result = self.run_normalization();
        self.normalizing = false;
        result
    }

    fn run_normalization(&mut self) -> EditorResult<()> {
        let budget = self.dirty_paths.len() * self.config.max_normalize_iterations_per_path;
        let mut passes = 0;

        while let Some(path) = self.pop_deepest_dirty_path() {
            if passes >= budget {
                error!(
                    budget,
                    path = %path,
                    "Normalization did not settle; normalizers are likely undoing each other"
                );
                self.dirty_paths.clear();
                return Ok(());
            }
            passes += 1;

            let Some(fix) = self.plan_fix(&path) else {
                continue;
            };
            trace!(path = %path, fix = ?fix, "Applying fix");
            self.apply_fix(fix)?;
        }

        debug!(passes, "Normalization settled");
        Ok(())
    }

    fn pop_deepest_dirty_path(&mut self) -> Option<Path> {
        let deepest = self
            .dirty_paths
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.len().cmp(&b.len()).then(ib.cmp(ia)))
            .map(|(index, _)| index)?;
        Some(self.dirty_paths.swap_remove(deepest))
    }

    fn plan_fix(&self, path: &Path) -> Option<Fix> {
        let entry = NodeRef::at(&self.document, path)?;
        let mut cx = NormalizeContext::new(&self.document);
        self.registry.normalize_node(entry, path, &mut cx);
        cx.into_fix()
    }

    fn apply_fix(&mut self, fix: Fix) -> EditorResult<()> {
        match fix {
            Fix::InsertNode { path, node } => self.insert_node(&path, node),
            Fix::RemoveNode { path } => self.remove_node(&path).map(drop),
            Fix::SetNode { path, properties } => self.set_node(&path, properties),
            Fix::MergeNode { path } => self.merge_node(&path),
            Fix::WrapNodes {
                parent,
                start,
                end,
                wrapper,
            } => self.wrap_nodes(&parent, start..end, wrapper),
            Fix::UnwrapNode { path } => self.unwrap_node(&path),
        }
    }
}

/// Normalize a detached document with the given plugins, e.g. before storing it
pub fn normalize_document(document: Document, stack: &PluginStack) -> EditorResult<Document> {
    let overlays = OverlayRegistry::new();
    let mut editor = Editor::assemble(document, stack.clone(), EditorConfig::default(), &overlays)?;
    Ok(editor.take_document())
}

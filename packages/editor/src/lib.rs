//! # Folio Editor
//!
//! Rich-text editing core for Folio documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: nodes, paths, ranges, stored values  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: operations + transforms             │
//! │  - Apply operations, track dirty paths      │
//! │  - Normalize after every change             │
//! │  - Plugins: normalizers, keys, renderers    │
//! │  - Modal side channels for void elements    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ render: document → VNode tree               │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Operations are the only way to change the tree**: transforms and
//!    normalizers both emit them
//! 2. **Normalization is incremental**: only paths touched by an operation are
//!    revisited, deepest first
//! 3. **Plugins compose by order**: later plugins take precedence
//! 4. **Modals never touch the tree directly**: they queue commands that the
//!    editor drains when the transaction ends
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_editor::{Editor, StoredDocument};
//! use folio_model::{Point, Range};
//!
//! let stored = StoredDocument::load("notes.json")?;
//! let mut editor = Editor::new(stored.document().clone())?;
//!
//! editor.select(Range::collapsed(Point::new([0, 0], 0)))?;
//! editor.insert_text("Hello")?;
//! let operations = editor.flush();
//! ```

mod config;
mod context;
mod document;
mod editor;
mod errors;
mod keys;
mod marks;
mod normalize;
mod operations;
mod plugin;
pub mod plugins;
mod render;
mod side_channel;
mod toolbar;
mod transforms;

pub use config::EditorConfig;
pub use context::{ReferenceData, RichContext};
pub use document::{DocumentStorage, StoredDocument};
pub use editor::Editor;
pub use errors::{EditorError, EditorResult};
pub use keys::{Hotkey, KeyEvent, Platform};
pub use marks::{is_mark_active, toggle_mark};
pub use normalize::{normalize_composite, normalize_document, Fix, NodeRef, NormalizeContext, Normalizer};
pub use operations::{rebase_path, NodeProperties, Operation, OperationError};
pub use plugin::{run_matching_hotkey, Plugin, PluginRegistry, PluginStack, RendererCollision};
pub use render::{
    render_document, render_leaf, Collaborators, DefaultCollaborators, ElementRenderer, RenderContext,
    RenderProps, TagRenderer, VNode,
};
pub use side_channel::{
    confirm, EditorId, EquationPayload, LinkPayload, ModalKind, ModalState, Modals, Origin, OverlayRegistry,
    ReferencePayload, SideChannel,
};
pub use toolbar::{shortcut_listing, Shortcut, ToolbarAction, ToolbarItem};

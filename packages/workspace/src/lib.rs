//! # Folio Workspace
//!
//! Hosting layer around the editor core.
//!
//! ```text
//! folio.config.json ──▶ WorkspaceConfig
//!                           │
//!                           ▼
//!   FormState ── one Editor per rich-text field, shared OverlayRegistry
//!       │
//!       ├──▶ ReferenceUsageIndex   (citation numbers)
//!       ├──▶ previews / emptiness  (plain-text export)
//!       │
//!   Lookup<Q, R>   debounced, latest request wins
//!   UploadQueue    background progress drained into an editor
//! ```
//!
//! Editors are single-threaded. Async work happens on tokio tasks that
//! report back through channels; the host applies results between
//! transactions.

mod config;
mod error;
mod form;
mod lookup;
mod upload;

pub use config::{WorkspaceConfig, DEFAULT_CONFIG_NAME};
pub use error::{WorkspaceError, WorkspaceResult};
pub use form::FormState;
pub use lookup::{Lookup, LookupState};
pub use upload::{UploadEvent, UploadQueue};

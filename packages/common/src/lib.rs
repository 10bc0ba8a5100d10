//! # Folio Common
//!
//! Pure functions over document trees plus small state machines shared by
//! the editor and its hosts. Nothing here mutates a document owned by an
//! editor; every function reads a snapshot or builds a new tree.

pub mod plain_text;
pub mod query;
pub mod reference_index;
pub mod selection_list;
pub mod visitor;

pub use plain_text::*;
pub use query::*;
pub use reference_index::*;
pub use selection_list::*;
pub use visitor::*;

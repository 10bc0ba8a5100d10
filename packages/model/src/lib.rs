//! # Folio Model
//!
//! Tree primitives shared by every other Folio crate.
//!
//! ```text
//! Document (root)
//!  └─ Node = Element { type, children, ...attrs }
//!          | Leaf    { text, ...marks }
//! ```
//!
//! - [`Path`]: child indices from the root to a node
//! - [`Point`] / [`Range`]: positions inside leaves and the selection between them
//! - [`TreeChange`]: the structural effect of an edit, used to carry paths,
//!   points and ranges across mutation boundaries
//! - [`persist`]: the plain nested value exchanged with storage

pub mod document;
pub mod element;
pub mod error;
pub mod marks;
pub mod node;
pub mod path;
pub mod persist;
pub mod range;

pub use document::{Descendants, Document};
pub use element::{Attrs, Element, ElementType};
pub use error::{ModelError, ModelResult};
pub use marks::{Mark, Marks};
pub use node::{Leaf, Node};
pub use path::{Affinity, Path, TreeChange};
pub use range::{Point, Range};

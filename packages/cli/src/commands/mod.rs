pub mod check;
pub mod normalize;
pub mod references;
pub mod text;

pub use check::{check, CheckArgs};
pub use normalize::{normalize, NormalizeArgs};
pub use references::{references, ReferencesArgs};
pub use text::{text, TextArgs};

use anyhow::{Context, Result};
use folio_model::Document;
use std::path::Path;

/// Read a stored document leniently; invalid content becomes the sentinel
pub(crate) fn read_document(path: &Path) -> Result<Document> {
    let source = std::fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    Ok(Document::from_json(&source))
}

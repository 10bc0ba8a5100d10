//! # Stored Documents
//!
//! A `StoredDocument` pairs a document tree with where it lives. Documents
//! can be:
//! - **Memory-backed**: temporary, for tests and previews
//! - **File-backed**: read from and saved to a JSON file
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Validate → Edit → Strip transient attrs → Save
//!   ↓        ↓        ↓              ↓              ↓
//! File  sentinel?  Editor      objectKey only      File
//! ```
//!
//! Loading is lenient: stored content that fails validation becomes the
//! invalid-content sentinel instead of an error.

use std::path::{Path, PathBuf};

use folio_common::strip_transient_attrs;
use folio_model::Document;
use serde_json::Value;
use tracing::{debug, info};

use crate::{EditorError, EditorResult};

/// A document tree and its backing storage
#[derive(Debug)]
pub struct StoredDocument {
    /// Path to the JSON file (informational for memory-backed documents)
    pub path: PathBuf,

    /// Increments every time the tree is replaced
    pub version: u64,

    storage: DocumentStorage,
}

#[derive(Debug)]
pub enum DocumentStorage {
    Memory { document: Document },

    File { document: Document, dirty: bool },
}

impl StoredDocument {
    /// Memory-backed document from a stored value
    pub fn from_value(path: impl Into<PathBuf>, value: Value) -> Self {
        Self {
            path: path.into(),
            version: 0,
            storage: DocumentStorage::Memory {
                document: Document::from_value(value),
            },
        }
    }

    pub fn in_memory(document: Document) -> Self {
        Self {
            path: PathBuf::new(),
            version: 0,
            storage: DocumentStorage::Memory { document },
        }
    }

    /// Load a file-backed document. Unreadable files are an error; readable
    /// files with invalid content load as the sentinel.
    pub fn load(path: impl AsRef<Path>) -> EditorResult<Self> {
        let path = path.as_ref().to_path_buf();
        let source = std::fs::read_to_string(&path)?;
        let document = Document::from_json(&source);
        if document.is_invalid_sentinel() {
            info!(path = %path.display(), "Stored document failed validation");
        } else {
            debug!(path = %path.display(), blocks = document.children.len(), "Loaded document");
        }

        Ok(Self {
            path,
            version: 0,
            storage: DocumentStorage::File { document, dirty: false },
        })
    }

    pub fn document(&self) -> &Document {
        match &self.storage {
            DocumentStorage::Memory { document } | DocumentStorage::File { document, .. } => document,
        }
    }

    pub fn is_file_backed(&self) -> bool {
        matches!(self.storage, DocumentStorage::File { .. })
    }

    /// Swap in an edited tree
    pub fn replace(&mut self, next: Document) {
        self.version += 1;
        match &mut self.storage {
            DocumentStorage::Memory { document } => *document = next,
            DocumentStorage::File { document, dirty } => {
                *document = next;
                *dirty = true;
            }
        }
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        match &self.storage {
            DocumentStorage::File { dirty, .. } => *dirty,
            DocumentStorage::Memory { .. } => false,
        }
    }

    /// The stored form: transient attributes stripped
    pub fn to_json(&self) -> EditorResult<String> {
        let mut children = self.document().children.clone();
        strip_transient_attrs(&mut children);
        Ok(Document::new(children).to_json_pretty()?)
    }

    /// Save document to disk (if file-backed)
    pub fn save(&mut self) -> EditorResult<()> {
        let json = self.to_json()?;
        match &mut self.storage {
            DocumentStorage::File { dirty, .. } => {
                std::fs::write(&self.path, json)?;
                *dirty = false;
                debug!(path = %self.path.display(), version = self.version, "Saved document");
                Ok(())
            }
            DocumentStorage::Memory { .. } => Err(EditorError::NotFileBacked),
        }
    }
}

//! Error types for the hosting layer

use folio_editor::EditorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field already exists: {0}")]
    DuplicateField(String),
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

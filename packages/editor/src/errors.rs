//! Error types for the editor

use folio_model::{ModelError, Path};
use thiserror::Error;

use crate::operations::OperationError;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Operation error: {0}")]
    Operation(#[from] OperationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid hotkey: {0}")]
    InvalidHotkey(String),

    #[error("No {0} at {1}")]
    UnexpectedNode(&'static str, Path),

    #[error("Document is not file-backed")]
    NotFileBacked,

    #[error("Document is read-only")]
    ReadOnly,
}

pub type EditorResult<T> = Result<T, EditorError>;

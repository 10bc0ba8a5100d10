//! Error types for the document model

use thiserror::Error;

use crate::Path;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("No node at path {0}")]
    PathNotFound(Path),

    #[error("Node at path {0} is not an element")]
    NotAnElement(Path),

    #[error("Node at path {0} is not a leaf")]
    NotALeaf(Path),

    #[error("Unknown mark: {0}")]
    UnknownMark(String),

    #[error("Invalid persisted value: {0}")]
    InvalidValue(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

//! Validation errors raised while building a page diff.
//!
//! Every variant is raised at the point of mutation, before anything is
//! appended to a page's change buffer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelesyncError {
    /// A value headed for the wire is not JSON-safe.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// A key is not a string without spaces or an integer.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// `add` was given an empty key or something that is not a property map.
    #[error("Invalid card: {0}")]
    InvalidCard(String),

    /// A data placeholder was assigned through a `Ref`, or the page was dropped.
    #[error("Invalid assignment: {0}")]
    InvalidAssignment(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TelesyncError>;

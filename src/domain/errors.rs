use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A single rule broken by a model's data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![Violation::new(field, message)])
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.violations.iter().map(|v| v.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Failures reported by a document store client. Surfaced to callers unchanged.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document not found: {index}/{id}")]
    NotFound { index: String, id: String },

    #[error("Version conflict: {0}")]
    Conflict(String),

    #[error("Request rejected ({status}): {reason}")]
    Rejected { status: u16, reason: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Store internal error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn not_found(index: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            index: index.into(),
            id: id.into(),
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    MissingIdentifier(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Initialization error: {0}")]
    Initialization(String),
}

impl DomainError {
    pub fn missing_identifier(operation: &str) -> Self {
        Self::MissingIdentifier(format!(
            "Cannot process {operation}, data.id missing on item"
        ))
    }

    pub fn initialization(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }
}

use pharmasite_common::CommonError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kind of access a store call performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Get,
    List,
    Create,
    Update,
    Delete,
    /// Set, with or without merge
    Write,
}

impl Operation {
    pub fn is_read(&self) -> bool {
        matches!(self, Operation::Get | Operation::List)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::List => "list",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Write => "write",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse failure classes callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    PermissionDenied,
    NotFound,
    Unknown,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Permission denied: {operation} on {path}")]
    PermissionDenied { path: String, operation: Operation },

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Path(#[from] CommonError),

    #[error("Store failure: {0}")]
    Unknown(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Path(_) | StoreError::Unknown(_) => ErrorKind::Unknown,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Unknown(format!("IO error: {}", e))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Unknown(format!("Serialization error: {}", e))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

//! Error types for the editor

use crate::validation::FieldErrors;
use pharmasite_common::CommonError;
use pharmasite_store::{ErrorKind, StoreError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SaveError {
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),

    #[error("A save is already in progress for {0}")]
    AlreadySaving(String),

    #[error("Could not build document: {0}")]
    Build(#[from] CommonError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure classes a save can end in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    Validation,
    Busy,
    PermissionDenied,
    NotFound,
    Unknown,
}

impl SaveError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SaveError::Validation(_) => FailureKind::Validation,
            SaveError::AlreadySaving(_) => FailureKind::Busy,
            SaveError::Build(_) => FailureKind::Unknown,
            SaveError::Store(e) => match e.kind() {
                ErrorKind::PermissionDenied => FailureKind::PermissionDenied,
                ErrorKind::NotFound => FailureKind::NotFound,
                ErrorKind::Unknown => FailureKind::Unknown,
            },
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            SaveError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

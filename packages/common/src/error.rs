use thiserror::Error;

/// Errors shared by every pharmasite package
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommonError {
    #[error("Invalid document path: {0}")]
    InvalidPath(String),

    #[error("Unknown page: {0}")]
    UnknownPage(String),

    #[error("Unknown settings document: {0}")]
    UnknownSettings(String),

    #[error("Malformed document: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for CommonError {
    fn from(e: serde_json::Error) -> Self {
        CommonError::Malformed(e.to_string())
    }
}

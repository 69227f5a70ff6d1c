//! Error types for mapassert

use crate::verify::VerificationFailure;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// mapassert errors
#[derive(Error, Debug)]
pub enum Error {
    /// A required argument was absent at declaration time
    #[error("Argument must not be null: {0}")]
    NullArgument(String),

    /// A property does not exist on its type or has an unexpected type
    #[error("Invalid property: {0}")]
    InvalidProperty(String),

    /// Reconciliation found one or more mismatches
    #[error("{0}")]
    Verification(VerificationFailure),

    /// The mapping configuration itself is malformed
    #[error("Mapping error: {0}")]
    Mapping(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Schema parse error: {0}")]
    SchemaParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn null_argument(name: &str) -> Self {
        Error::NullArgument(name.to_string())
    }

    /// Mismatches carried by a verification failure, empty for any other error
    pub fn mismatches(&self) -> &[crate::verify::Mismatch] {
        match self {
            Error::Verification(failure) => &failure.mismatches,
            _ => &[],
        }
    }
}

impl From<VerificationFailure> for Error {
    fn from(failure: VerificationFailure) -> Self {
        Error::Verification(failure)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

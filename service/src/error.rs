//! Error types for the `service` layer.
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use std::error::Error as StdError;
use std::fmt;

/// Top-level service error type.
/// The `error_kind` tells `web` which HTTP status to answer with, and the
/// `source` keeps the original error for logging.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Enum representing the kinds of errors that can occur in the `service` layer.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// The caller has no valid session or credential.
    Unauthenticated,
    /// The request was understood but its content is not acceptable.
    Invalid(String),
    /// The service is missing configuration it needs for this operation.
    Config(String),
    Other(String),
}

impl Error {
    pub fn new(error_kind: ErrorKind) -> Self {
        Self {
            source: None,
            error_kind,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        self.error_kind == ErrorKind::Unauthenticated
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Service Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// Malformed, forged or expired tokens mean the caller is unauthenticated. Key and
// algorithm problems are on our side.
impl From<JwtError> for Error {
    fn from(err: JwtError) -> Self {
        let error_kind = match err.kind() {
            JwtErrorKind::InvalidKeyFormat
            | JwtErrorKind::InvalidAlgorithmName
            | JwtErrorKind::MissingAlgorithm => {
                ErrorKind::Config("JWT key or algorithm misconfigured".to_string())
            }
            _ => ErrorKind::Unauthenticated,
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            error_kind: ErrorKind::Invalid(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}

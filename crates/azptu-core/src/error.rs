//! Error types shared across the azptu crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which capacity rule a deployment request violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationKind {
    /// Requested capacity is below the model's minimum for the tier.
    MinCapacity,
    /// Requested capacity is not `min + n * increment` for the tier.
    IncrementMismatch,
    /// The model has no regional tier but a regional deployment was requested.
    UnsupportedTier,
    /// The remote record carries no model identity to validate against.
    MissingModelIdentity,
}

/// A shared error type for the azptu application.
///
/// Every remote failure classifies into exactly one variant; validation
/// failures are resolved locally and never reach the remote boundary.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum PtuError {
    /// Capacity validation failed before any remote call was made.
    #[error("{message}")]
    Validation {
        kind: ValidationKind,
        message: String,
    },

    /// Credential acquisition or the credential test failed.
    #[error("Authentication required: {message}")]
    AuthenticationRequired { message: String },

    /// The remote platform reported a 404 for the addressed resource.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// 429-equivalent: PTU capacity is not available in the region.
    #[error("PTU capacity not available: {message}")]
    CapacityUnavailable { message: String },

    /// 403-equivalent: the subscription's quota cannot cover the request.
    #[error("Insufficient quota: {message}")]
    QuotaInsufficient { message: String },

    /// Any other remote failure that carried a status code.
    #[error("Remote error (HTTP {code}): {message}")]
    Remote { code: u16, message: String },

    /// A failure with no status code available (connect, timeout, subprocess).
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Fatal: the embedded catalog is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local filesystem error that must surface to the caller.
    #[error("IO error: {message}")]
    Io { message: String },
}

impl PtuError {
    /// Creates a Validation error.
    pub fn validation(kind: ValidationKind, message: impl Into<String>) -> Self {
        Self::Validation {
            kind,
            message: message.into(),
        }
    }

    /// Creates an AuthenticationRequired error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::AuthenticationRequired {
            message: message.into(),
        }
    }

    /// Creates a NotFound error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a Config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Check if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error (resolved locally, no remote call).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this is an authentication error.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::AuthenticationRequired { .. })
    }
}

impl From<std::io::Error> for PtuError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for PtuError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

/// A type alias for `Result<T, PtuError>`.
pub type Result<T> = std::result::Result<T, PtuError>;

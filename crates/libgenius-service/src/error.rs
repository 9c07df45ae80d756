//! # Service Error Type
//!
//! The one error type callers of [`crate::LibraryService`] see.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ValidationError ──► CoreError ──┐                                     │
//! │                                  ├──► ServiceError ──► code()          │
//! │  sqlx::Error ──► DbError ────────┘         │                           │
//! │                                            ▼                           │
//! │  config file / env ────────────────► ErrorBody { code, message }       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lending errors keep their message verbatim ("borrow failed: book b1 is
//! BORROWED: ..."), store errors are logged in full and reported with a
//! generic message.

use libgenius_core::CoreError;
use libgenius_db::DbError;
use serde::Serialize;
use thiserror::Error;

/// Errors returned by the lending service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A lending rule rejected the operation. Nothing was written.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The record store failed.
    #[error("Store error: {0}")]
    Store(#[from] DbError),

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file could not be parsed.
    #[error("Config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// The config could not be written as TOML.
    #[error("Config serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// A snapshot could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown book id
    NotFound,

    /// Operation not legal in the book's current status
    InvalidState,

    /// Import payload is not a book sequence
    MalformedInput,

    /// Input validation failed
    ValidationError,

    /// Record store failed
    StoreError,

    /// Configuration could not be loaded
    ConfigError,

    /// Anything else
    Internal,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InvalidState => "INVALID_STATE",
            ErrorCode::MalformedInput => "MALFORMED_INPUT",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::StoreError => "STORE_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl ServiceError {
    /// Returns the stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::Core(CoreError::NotFound { .. }) => ErrorCode::NotFound,
            ServiceError::Core(CoreError::InvalidState { .. }) => ErrorCode::InvalidState,
            ServiceError::Core(CoreError::MalformedInput(_)) => ErrorCode::MalformedInput,
            ServiceError::Core(CoreError::Validation(_)) => ErrorCode::ValidationError,
            ServiceError::Store(_) => ErrorCode::StoreError,
            ServiceError::Config(_) | ServiceError::TomlDe(_) | ServiceError::TomlSer(_) => {
                ErrorCode::ConfigError
            }
            ServiceError::Io(_) | ServiceError::Serialization(_) => ErrorCode::Internal,
        }
    }

    /// Returns the core error, if this is a lending rule violation.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            ServiceError::Core(err) => Some(err),
            _ => None,
        }
    }
}

/// Serializable error body for whatever front end sits on top.
///
/// ```json
/// { "code": "INVALID_STATE", "message": "borrow failed: book b1 is BORROWED: ..." }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&ServiceError> for ErrorBody {
    fn from(err: &ServiceError) -> Self {
        let message = match err {
            ServiceError::Store(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Store operation failed: {}", e);
                "Storage operation failed".to_string()
            }
            other => other.to_string(),
        };
        ErrorBody {
            code: err.code(),
            message,
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

//! # Error Types
//!
//! Domain-specific error types for libgenius-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  libgenius-core errors (this file)                                     │
//! │  ├── CoreError        - Lending rule violations                        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  libgenius-db errors (separate crate)                                  │
//! │  └── DbError          - Record store failures                          │
//! │                                                                         │
//! │  libgenius-service errors                                              │
//! │  └── ServiceError     - What callers see (with a stable code)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError ← DbError            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Every lending error names the operation and the book id
//! 3. Errors are enum variants, never String
//! 4. A returned error always means nothing was mutated

use std::fmt;

use thiserror::Error;

use crate::types::BookStatus;

// =============================================================================
// Operation
// =============================================================================

/// The lifecycle operation that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Get,
    Borrow,
    Return,
    Reserve,
    CancelReservation,
    MarkLost,
    MarkFound,
    Import,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Get => "get",
            Operation::Borrow => "borrow",
            Operation::Return => "return",
            Operation::Reserve => "reserve",
            Operation::CancelReservation => "cancel reservation",
            Operation::MarkLost => "mark lost",
            Operation::MarkFound => "mark found",
            Operation::Import => "import",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Lending rule violations.
///
/// Every variant is constructed locally by [`crate::lifecycle`] or
/// [`crate::transfer`] before any mutation takes place.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The referenced book id does not exist.
    #[error("{operation} failed: book {id} not found")]
    NotFound { operation: Operation, id: String },

    /// The operation is not legal in the book's current status.
    ///
    /// ## When This Occurs
    /// - Borrowing a book that is already borrowed or lost
    /// - Reserving an available book (borrow it instead)
    /// - Reserving a book that already has a pending reservation
    /// - Returning a book that is not borrowed
    #[error("{operation} failed: book {id} is {status}: {reason}")]
    InvalidState {
        operation: Operation,
        id: String,
        status: BookStatus,
        reason: String,
    },

    /// An import payload is not structurally a book sequence.
    #[error("import failed: malformed input: {0}")]
    MalformedInput(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for an operation and book id.
    pub fn not_found(operation: Operation, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            operation,
            id: id.into(),
        }
    }

    /// Creates an InvalidState error.
    pub fn invalid_state(
        operation: Operation,
        id: impl Into<String>,
        status: BookStatus,
        reason: impl Into<String>,
    ) -> Self {
        CoreError::InvalidState {
            operation,
            id: id.into(),
            status,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Duplicate value (e.g., duplicate book id).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// A borrow history does not satisfy the open-record rule.
    #[error("borrow history of book {id} is inconsistent: {reason}")]
    InvalidHistory { id: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

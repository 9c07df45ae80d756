//! # Validation Module
//!
//! Input validation for LibGenius lending operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Type system                                                  │
//! │  ├── Lending variant makes borrower/reservation combos unrepresentable │
//! │  └── JSON decode rejects records missing required lending fields       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Names and titles (non-empty, bounded)                             │
//! │  ├── Open-record rule on supplied histories                            │
//! │  └── Id uniqueness across a snapshot                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── PRIMARY KEY on books.id                                           │
//! │  └── Foreign key from borrow_records to books                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{BorrowRecord, Lending};
use crate::{MAX_READER_NAME_LEN, MAX_TITLE_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a reader name (borrower or reservation holder).
///
/// ## Rules
/// - Must not be blank
/// - At most 100 characters
///
/// ## Returns
/// The trimmed name.
///
/// ## Example
/// ```rust
/// use libgenius_core::validation::validate_reader_name;
///
/// assert_eq!(validate_reader_name("  Alice ").unwrap(), "Alice");
/// assert!(validate_reader_name("   ").is_err());
/// ```
pub fn validate_reader_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "reader name".to_string(),
        });
    }

    if name.chars().count() > MAX_READER_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "reader name".to_string(),
            max: MAX_READER_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates a book title.
///
/// ## Rules
/// - Must not be blank
/// - At most 300 characters
pub fn validate_title(title: &str) -> ValidationResult<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::Required {
            field: "title".to_string(),
        });
    }

    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: MAX_TITLE_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// History Validators
// =============================================================================

/// Validates a borrow history against the book's lending state.
///
/// ## Rules
/// - At most one open record, and only as the last element
/// - A borrowed book's last record is open and belongs to the borrower
/// - An available or lost book has no open record
pub fn validate_history(
    id: &str,
    lending: &Lending,
    history: &[BorrowRecord],
) -> ValidationResult<()> {
    let invalid = |reason: &str| ValidationError::InvalidHistory {
        id: id.to_string(),
        reason: reason.to_string(),
    };

    let open_count = history.iter().filter(|r| r.is_open()).count();
    if open_count > 1 {
        return Err(invalid("more than one open record"));
    }

    let last_open = history.last().filter(|r| r.is_open());
    if open_count == 1 && last_open.is_none() {
        return Err(invalid("open record is not the most recent one"));
    }

    if let Some(record) = history.iter().find(|r| {
        r.return_date
            .is_some_and(|returned| returned < r.borrow_date)
    }) {
        return Err(ValidationError::InvalidHistory {
            id: id.to_string(),
            reason: format!(
                "record for {} returns before it was borrowed",
                record.borrower_name
            ),
        });
    }

    match (lending, last_open) {
        (Lending::Borrowed(loan), Some(open)) => {
            if open.borrower_name != loan.borrower_name || open.borrow_date != loan.borrow_date {
                return Err(invalid("open record does not match the current loan"));
            }
        }
        (Lending::Borrowed(_), None) => {
            return Err(invalid("borrowed book has no open record"));
        }
        (Lending::Available | Lending::Lost, Some(_)) => {
            return Err(invalid("book is not borrowed but has an open record"));
        }
        (Lending::Available | Lending::Lost, None) => {}
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that every id in the iterator is unique.
///
/// ## Returns
/// `Err(Duplicate)` naming the first repeated id.
pub fn validate_unique_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> ValidationResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::Duplicate {
                field: "id".to_string(),
                value: id.to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

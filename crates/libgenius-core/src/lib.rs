//! # libgenius-core: Pure Lending Logic for LibGenius
//!
//! This crate is the **heart** of LibGenius. It contains the lending state
//! machine and every derived statistic as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        LibGenius Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              libgenius-service (LibraryService)                 │   │
//! │  │    write lock ──► load ──► apply transition ──► replace_all    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ libgenius-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ lifecycle │  │   stats   │  │ transfer  │  │   │
//! │  │   │   Book    │  │  borrow   │  │  overdue  │  │  export   │  │   │
//! │  │   │  Lending  │  │  return   │  │  readers  │  │  import   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 libgenius-db (Record Store)                     │   │
//! │  │              load() / replace_all() of the snapshot             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Book, Lending, BorrowRecord, ...)
//! - [`lifecycle`] - Legal status transitions over a snapshot
//! - [`stats`] - Reader and library statistics, recomputed on demand
//! - [`transfer`] - Whole-collection export/import
//! - [`suggest`] - Parsing and merging AI metadata suggestions
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use libgenius_core::{lifecycle, Book, BookFields, BookStatus};
//!
//! let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let mut books = vec![Book::new("b1", BookFields::titled("Dune"))];
//!
//! let book = lifecycle::borrow(&mut books, "b1", "Alice", today).unwrap();
//! assert_eq!(book.status(), BookStatus::Borrowed);
//! assert_eq!(book.due_date(), NaiveDate::from_ymd_opt(2024, 3, 31));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lifecycle;
pub mod stats;
pub mod suggest;
pub mod transfer;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, Operation, ValidationError};
pub use transfer::ImportPolicy;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Loan period in days.
///
/// `due_date = borrow_date + LOAN_PERIOD_DAYS`, fixed at borrow time and
/// never recomputed.
pub const LOAN_PERIOD_DAYS: u64 = 30;

/// Maximum length of a reader name.
pub const MAX_READER_NAME_LEN: usize = 100;

/// Maximum length of a book title.
pub const MAX_TITLE_LEN: usize = 300;

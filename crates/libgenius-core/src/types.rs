//! # Domain Types
//!
//! Core domain types used throughout LibGenius.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────────┐   ┌─────────────────┐  │
//! │  │      Book       │   │       Lending        │   │  BorrowRecord   │  │
//! │  │  ─────────────  │   │  ──────────────────  │   │  ─────────────  │  │
//! │  │  id             │──►│  Available           │   │  borrower_name  │  │
//! │  │  title, author  │   │  Borrowed(Loan) ─────┼──►│  borrow_date    │  │
//! │  │  isbn, category │   │    borrower_name     │   │  return_date?   │  │
//! │  │  lending        │   │    borrow_date       │   └─────────────────┘  │
//! │  │  borrow_history │   │    due_date          │            ▲           │
//! │  └────────┬────────┘   │    reserved_by?      │            │           │
//! │           │            │  Lost                │            │           │
//! │           │            └──────────────────────┘            │           │
//! │           └────────────── Vec<BorrowRecord> ───────────────┘           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Explicit Lending State
//! Borrower, borrow date and due date only exist inside `Lending::Borrowed`,
//! and a reservation only exists inside a `Loan`. A book that is available
//! with a borrower, or reserved while lost, cannot be constructed.
//!
//! ## Wire Layout
//! The lending variant is flattened into the book record with a `status`
//! tag, so an exported book looks like:
//! ```json
//! {
//!   "id": "2",
//!   "title": "The Three-Body Problem",
//!   "status": "BORROWED",
//!   "borrowerName": "Zhang San",
//!   "borrowDate": "2024-11-15",
//!   "dueDate": "2024-12-15",
//!   "borrowHistory": [{ "borrowerName": "Zhang San", "borrowDate": "2024-11-15" }]
//! }
//! ```

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// Book Status
// =============================================================================

/// The coarse status of a book, derived from its [`Lending`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookStatus {
    Available,
    Borrowed,
    Lost,
}

impl BookStatus {
    /// Returns the wire/storage name of the status.
    pub const fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "AVAILABLE",
            BookStatus::Borrowed => "BORROWED",
            BookStatus::Lost => "LOST",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Loan
// =============================================================================

/// An active loan of a borrowed book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    /// Reader currently holding the book.
    pub borrower_name: String,

    /// Day the book was lent out.
    pub borrow_date: NaiveDate,

    /// `borrow_date + LOAN_PERIOD_DAYS`, fixed at borrow time.
    pub due_date: NaiveDate,

    /// The single pending reservation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_by: Option<String>,
}

// =============================================================================
// Lending
// =============================================================================

/// The lending state of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lending {
    /// On the shelf, can be borrowed.
    Available,
    /// Lent out to a reader.
    Borrowed(Loan),
    /// Reported lost.
    Lost,
}

impl Default for Lending {
    fn default() -> Self {
        Lending::Available
    }
}

impl Lending {
    /// Returns the coarse status of this lending state.
    pub fn status(&self) -> BookStatus {
        match self {
            Lending::Available => BookStatus::Available,
            Lending::Borrowed(_) => BookStatus::Borrowed,
            Lending::Lost => BookStatus::Lost,
        }
    }
}

// =============================================================================
// Borrow Record
// =============================================================================

/// One lending episode in a book's history.
///
/// `borrower_name` and `borrow_date` never change after creation;
/// `return_date` is set exactly once, when the episode ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecord {
    pub borrower_name: String,
    pub borrow_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
}

impl BorrowRecord {
    /// Creates an open record for a new loan.
    pub fn open(borrower_name: impl Into<String>, borrow_date: NaiveDate) -> Self {
        BorrowRecord {
            borrower_name: borrower_name.into(),
            borrow_date,
            return_date: None,
        }
    }

    /// Returns true if this record denotes an active loan.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }
}

// =============================================================================
// Book Fields
// =============================================================================

/// Descriptive fields supplied by a catalog create/update.
///
/// There are deliberately no lending fields here: status, borrower and
/// reservation only change through [`crate::lifecycle`] transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookFields {
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub publish_date: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub cover_url: String,

    /// Replacement history for an update. `None` keeps the stored history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrow_history: Option<Vec<BorrowRecord>>,
}

impl BookFields {
    /// Creates fields with only a title set.
    pub fn titled(title: impl Into<String>) -> Self {
        BookFields {
            title: title.into(),
            ..Default::default()
        }
    }
}

// =============================================================================
// Book
// =============================================================================

/// A physical copy in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique identifier, immutable once assigned.
    pub id: String,

    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub publish_date: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub cover_url: String,

    /// Current lending state (flattened with a `status` tag).
    #[serde(flatten)]
    pub lending: Lending,

    /// Append-only lending episodes, oldest first.
    #[serde(default)]
    pub borrow_history: Vec<BorrowRecord>,
}

impl Book {
    /// Creates an available book with an empty history.
    ///
    /// Any `borrow_history` in `fields` is ignored: new books start clean.
    pub fn new(id: impl Into<String>, fields: BookFields) -> Self {
        let mut book = Book {
            id: id.into(),
            title: String::new(),
            author: String::new(),
            isbn: String::new(),
            category: String::new(),
            publish_date: String::new(),
            summary: String::new(),
            cover_url: String::new(),
            lending: Lending::Available,
            borrow_history: Vec::new(),
        };
        book.apply_descriptive(fields);
        book
    }

    /// Overwrites every descriptive field. Lending state and history are
    /// left untouched.
    pub(crate) fn apply_descriptive(&mut self, fields: BookFields) {
        self.title = fields.title;
        self.author = fields.author;
        self.isbn = fields.isbn;
        self.category = fields.category;
        self.publish_date = fields.publish_date;
        self.summary = fields.summary;
        self.cover_url = fields.cover_url;
    }

    /// Returns the descriptive fields of this book (for editing forms).
    pub fn fields(&self) -> BookFields {
        BookFields {
            title: self.title.clone(),
            author: self.author.clone(),
            isbn: self.isbn.clone(),
            category: self.category.clone(),
            publish_date: self.publish_date.clone(),
            summary: self.summary.clone(),
            cover_url: self.cover_url.clone(),
            borrow_history: None,
        }
    }

    #[inline]
    pub fn status(&self) -> BookStatus {
        self.lending.status()
    }

    /// Returns the active loan, if the book is borrowed.
    pub fn loan(&self) -> Option<&Loan> {
        match &self.lending {
            Lending::Borrowed(loan) => Some(loan),
            _ => None,
        }
    }

    pub fn borrower_name(&self) -> Option<&str> {
        self.loan().map(|l| l.borrower_name.as_str())
    }

    pub fn borrow_date(&self) -> Option<NaiveDate> {
        self.loan().map(|l| l.borrow_date)
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.loan().map(|l| l.due_date)
    }

    pub fn reserved_by(&self) -> Option<&str> {
        self.loan().and_then(|l| l.reserved_by.as_deref())
    }

    /// Returns true if the book is borrowed and its due date is before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date().is_some_and(|due| due < today)
    }

    /// Returns the open record, which can only be the last one.
    pub fn open_record(&self) -> Option<&BorrowRecord> {
        self.borrow_history.last().filter(|r| r.is_open())
    }
}

// =============================================================================
// Derived Types
// =============================================================================

/// Per-reader lending statistics (derived, never stored).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderStats {
    pub name: String,
    /// Total history entries across all books.
    pub borrow_count: usize,
    /// Books presently lent to this reader.
    pub current_borrowed: usize,
}

/// Emitted when a reserved book is returned.
///
/// The reservation is cleared and the reader is expected to be notified;
/// the book is NOT automatically lent to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationReady {
    pub book_id: String,
    pub reader_name: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_book_is_available_with_empty_history() {
        let mut fields = BookFields::titled("Dune");
        fields.borrow_history = Some(vec![BorrowRecord::open("Eve", date(2024, 1, 1))]);

        let book = Book::new("b1", fields);
        assert_eq!(book.status(), BookStatus::Available);
        assert!(book.borrow_history.is_empty());
        assert_eq!(book.borrower_name(), None);
    }

    #[test]
    fn test_borrowed_book_serializes_flat_with_status_tag() {
        let mut book = Book::new("2", BookFields::titled("Three Body"));
        book.lending = Lending::Borrowed(Loan {
            borrower_name: "Zhang".to_string(),
            borrow_date: date(2024, 11, 15),
            due_date: date(2024, 12, 15),
            reserved_by: None,
        });
        book.borrow_history
            .push(BorrowRecord::open("Zhang", date(2024, 11, 15)));

        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["status"], "BORROWED");
        assert_eq!(json["borrowerName"], "Zhang");
        assert_eq!(json["dueDate"], "2024-12-15");
        assert!(json.get("reservedBy").is_none());
        assert!(json["borrowHistory"][0].get("returnDate").is_none());
    }

    #[test]
    fn test_available_record_ignores_stale_borrower_fields() {
        let json = r#"{
            "id": "1", "title": "React", "author": "", "isbn": "", "category": "Tech",
            "publishDate": "2023-01-15", "summary": "", "coverUrl": "",
            "status": "AVAILABLE", "borrowerName": "ghost", "borrowHistory": []
        }"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.lending, Lending::Available);
    }

    #[test]
    fn test_borrowed_record_without_due_date_is_rejected() {
        let json = r#"{
            "id": "1", "title": "React", "status": "BORROWED",
            "borrowerName": "Li", "borrowDate": "2024-01-01"
        }"#;
        assert!(serde_json::from_str::<Book>(json).is_err());
    }

    #[test]
    fn test_overdue_uses_due_date() {
        let mut book = Book::new("b1", BookFields::titled("Dune"));
        assert!(!book.is_overdue(date(2030, 1, 1)));

        book.lending = Lending::Borrowed(Loan {
            borrower_name: "Alice".to_string(),
            borrow_date: date(2024, 1, 1),
            due_date: date(2024, 1, 31),
            reserved_by: Some("Bob".to_string()),
        });
        assert!(!book.is_overdue(date(2024, 1, 31)));
        assert!(book.is_overdue(date(2024, 2, 1)));
        assert_eq!(book.reserved_by(), Some("Bob"));
    }
}

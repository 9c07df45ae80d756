//! # Book Lifecycle
//!
//! Legal lending transitions over a collection snapshot.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Lending State Machine                             │
//! │                                                                         │
//! │                  borrow(name)                                           │
//! │   ┌───────────┐ ─────────────────────► ┌────────────────────────────┐  │
//! │   │ Available │                        │ Borrowed { reserved: None }│  │
//! │   └───────────┘ ◄───────────────────── └────────────────────────────┘  │
//! │     ▲   ▲   │          return                 │            ▲           │
//! │     │   │   │                        reserve  │            │ cancel    │
//! │     │   │   │                                 ▼            │           │
//! │     │   │   │   return + ReservationReady ┌──────────────────────────┐ │
//! │     │   └───┼──────────────────────────── │ Borrowed { reserved: R } │ │
//! │     │       │                             └──────────────────────────┘ │
//! │     │       │ mark_lost          mark_lost (from either Borrowed)      │
//! │     │       ▼                                    │                     │
//! │     │   ┌───────┐ ◄──────────────────────────────┘                     │
//! │     └── │ Lost  │                                                      │
//! │ mark_found └───────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Contract
//! Every function locates the book, checks all preconditions and only then
//! mutates. An `Err` means the snapshot was not touched.
//!
//! `today` is supplied by the caller; nothing here reads the clock.

use chrono::{Days, NaiveDate};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, Operation, ValidationError};
use crate::types::{Book, BookFields, BookStatus, BorrowRecord, Lending, Loan, ReservationReady};
use crate::validation::{validate_reader_name, validate_title};
use crate::LOAN_PERIOD_DAYS;

/// Result of returning a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnReceipt {
    /// The book after the return.
    pub book: Book,
    /// Present when a pending reservation was handed off.
    pub reservation_ready: Option<ReservationReady>,
}

/// Generates a new book id.
pub fn new_book_id() -> String {
    Uuid::new_v4().to_string()
}

/// Computes the due date for a loan starting on `borrow_date`.
pub fn due_date_for(borrow_date: NaiveDate) -> Option<NaiveDate> {
    borrow_date.checked_add_days(Days::new(LOAN_PERIOD_DAYS))
}

fn position(books: &[Book], operation: Operation, id: &str) -> CoreResult<usize> {
    books
        .iter()
        .position(|b| b.id == id)
        .ok_or_else(|| CoreError::not_found(operation, id))
}

// =============================================================================
// Catalog Operations
// =============================================================================

/// Creates a new book, or overwrites an existing one's descriptive fields.
///
/// ## Behavior
/// - `existing_id = None`: new UUID, `Available`, empty history
/// - `existing_id = Some(id)`: see [`update_book`]
pub fn create_or_update(
    books: &mut Vec<Book>,
    fields: BookFields,
    existing_id: Option<&str>,
) -> CoreResult<Book> {
    match existing_id {
        Some(id) => update_book(books, id, fields),
        None => create_book(books, new_book_id(), fields),
    }
}

/// Appends a new available book with the given id.
pub fn create_book(books: &mut Vec<Book>, id: String, fields: BookFields) -> CoreResult<Book> {
    validate_title(&fields.title)?;

    if books.iter().any(|b| b.id == id) {
        return Err(ValidationError::Duplicate {
            field: "id".to_string(),
            value: id,
        }
        .into());
    }

    let book = Book::new(id, fields);
    books.push(book.clone());
    Ok(book)
}

/// Overwrites every descriptive field of an existing book.
///
/// ## History
/// - `fields.borrow_history = None`: the stored history is kept
/// - `Some(history)`: must equal the stored history. Records only change
///   through borrow, return and mark-lost, so anything else is rejected
///   with `InvalidHistory`
///
/// Lending state is never changed by an update.
pub fn update_book(books: &mut [Book], id: &str, mut fields: BookFields) -> CoreResult<Book> {
    let idx = position(books, Operation::Update, id)?;
    validate_title(&fields.title)?;

    if let Some(history) = fields.borrow_history.take() {
        if history != books[idx].borrow_history {
            return Err(ValidationError::InvalidHistory {
                id: id.to_string(),
                reason: "borrow history cannot be edited through a catalog update".to_string(),
            }
            .into());
        }
    }

    let book = &mut books[idx];
    book.apply_descriptive(fields);
    Ok(book.clone())
}

/// Removes a book regardless of its status.
///
/// ## Returns
/// The removed book.
pub fn delete_book(books: &mut Vec<Book>, id: &str) -> CoreResult<Book> {
    let idx = position(books, Operation::Delete, id)?;
    Ok(books.remove(idx))
}

// =============================================================================
// Lending Operations
// =============================================================================

/// Lends an available book to `borrower_name`.
///
/// ## Effects
/// - `Borrowed { borrower, today, today + 30d, reserved_by: None }`
/// - Appends an open `BorrowRecord`
///
/// ## Errors
/// - `NotFound`: unknown id
/// - `Validation`: blank borrower name
/// - `InvalidState`: book is borrowed or lost
pub fn borrow(
    books: &mut [Book],
    id: &str,
    borrower_name: &str,
    today: NaiveDate,
) -> CoreResult<Book> {
    let idx = position(books, Operation::Borrow, id)?;
    let borrower_name = validate_reader_name(borrower_name)?;

    let book = &mut books[idx];
    match book.lending {
        Lending::Available => {}
        Lending::Borrowed(_) => {
            return Err(CoreError::invalid_state(
                Operation::Borrow,
                id,
                BookStatus::Borrowed,
                "book is already lent out",
            ))
        }
        Lending::Lost => {
            return Err(CoreError::invalid_state(
                Operation::Borrow,
                id,
                BookStatus::Lost,
                "a lost book cannot be lent",
            ))
        }
    }

    let due_date = due_date_for(today).ok_or_else(|| {
        CoreError::invalid_state(
            Operation::Borrow,
            id,
            BookStatus::Available,
            "due date is out of calendar range",
        )
    })?;

    book.borrow_history
        .push(BorrowRecord::open(borrower_name.clone(), today));
    book.lending = Lending::Borrowed(Loan {
        borrower_name,
        borrow_date: today,
        due_date,
        reserved_by: None,
    });

    Ok(book.clone())
}

/// Takes a borrowed book back.
///
/// ## Effects
/// - Closes the open record with `today`
/// - Status becomes `Available`, loan fields are cleared
/// - A pending reservation is cleared and reported in the receipt
///
/// The reserving reader is only notified; the book is not lent to them.
///
/// ## Errors
/// - `InvalidState`: book is not borrowed, or `today` is before the loan began
pub fn return_book(books: &mut [Book], id: &str, today: NaiveDate) -> CoreResult<ReturnReceipt> {
    let idx = position(books, Operation::Return, id)?;

    let book = &mut books[idx];
    if book.status() != BookStatus::Borrowed {
        return Err(CoreError::invalid_state(
            Operation::Return,
            id,
            book.status(),
            "only a borrowed book can be returned",
        ));
    }
    ensure_loan_started(Operation::Return, book, today)?;

    let reserved_by = match std::mem::take(&mut book.lending) {
        Lending::Borrowed(loan) => loan.reserved_by,
        Lending::Available | Lending::Lost => None,
    };

    close_open_record(book, today);

    let reservation_ready = reserved_by.map(|reader_name| ReservationReady {
        book_id: book.id.clone(),
        reader_name,
    });

    Ok(ReturnReceipt {
        book: book.clone(),
        reservation_ready,
    })
}

/// Places the single pending reservation on a borrowed book.
///
/// ## Errors
/// - `InvalidState`: book is available (borrow it directly), lost, or
///   already reserved
pub fn reserve(books: &mut [Book], id: &str, reader_name: &str) -> CoreResult<Book> {
    let idx = position(books, Operation::Reserve, id)?;
    let reader_name = validate_reader_name(reader_name)?;

    let book = &mut books[idx];
    let status = book.status();
    let loan = match &mut book.lending {
        Lending::Borrowed(loan) => loan,
        Lending::Available => {
            return Err(CoreError::invalid_state(
                Operation::Reserve,
                id,
                status,
                "book is on the shelf, borrow it instead",
            ))
        }
        Lending::Lost => {
            return Err(CoreError::invalid_state(
                Operation::Reserve,
                id,
                status,
                "a lost book cannot be reserved",
            ))
        }
    };

    if let Some(holder) = &loan.reserved_by {
        return Err(CoreError::invalid_state(
            Operation::Reserve,
            id,
            status,
            format!("already reserved by {holder}"),
        ));
    }

    loan.reserved_by = Some(reader_name);
    Ok(book.clone())
}

/// Clears a pending reservation. A book without one is left as is.
pub fn cancel_reservation(books: &mut [Book], id: &str) -> CoreResult<Book> {
    let idx = position(books, Operation::CancelReservation, id)?;

    let book = &mut books[idx];
    if let Lending::Borrowed(loan) = &mut book.lending {
        loan.reserved_by = None;
    }

    Ok(book.clone())
}

/// Reports a book as lost.
///
/// A borrowed book's open record is closed with `today` and its pending
/// reservation is dropped without a hand-off. `today` must not be before
/// the loan began.
pub fn mark_lost(books: &mut [Book], id: &str, today: NaiveDate) -> CoreResult<Book> {
    let idx = position(books, Operation::MarkLost, id)?;

    let book = &mut books[idx];
    match book.status() {
        BookStatus::Lost => {
            return Err(CoreError::invalid_state(
                Operation::MarkLost,
                id,
                BookStatus::Lost,
                "book is already reported lost",
            ))
        }
        BookStatus::Borrowed => {
            ensure_loan_started(Operation::MarkLost, book, today)?;
            close_open_record(book, today);
        }
        BookStatus::Available => {}
    }

    book.lending = Lending::Lost;
    Ok(book.clone())
}

/// Puts a lost book back on the shelf.
pub fn mark_found(books: &mut [Book], id: &str) -> CoreResult<Book> {
    let idx = position(books, Operation::MarkFound, id)?;

    let book = &mut books[idx];
    if book.lending != Lending::Lost {
        return Err(CoreError::invalid_state(
            Operation::MarkFound,
            id,
            book.status(),
            "only a lost book can be found",
        ));
    }

    book.lending = Lending::Available;
    Ok(book.clone())
}

/// Rejects a `today` earlier than the start of the current loan or its
/// open record.
fn ensure_loan_started(operation: Operation, book: &Book, today: NaiveDate) -> CoreResult<()> {
    let started = book
        .loan()
        .map(|loan| loan.borrow_date)
        .into_iter()
        .chain(book.open_record().map(|r| r.borrow_date))
        .max();

    match started {
        Some(borrow_date) if today < borrow_date => Err(CoreError::invalid_state(
            operation,
            &book.id,
            book.status(),
            format!("{today} is before the loan began on {borrow_date}"),
        )),
        _ => Ok(()),
    }
}

/// Closes the last record if it is open. Earlier records are never touched.
fn close_open_record(book: &mut Book, today: NaiveDate) {
    if let Some(record) = book.borrow_history.last_mut().filter(|r| r.is_open()) {
        record.return_date = Some(today);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

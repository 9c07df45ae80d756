//! # Statistics
//!
//! Reader and library metrics derived from a collection snapshot.
//!
//! Everything here is recomputed from scratch on every call and nothing is
//! cached. Collections are small; a full pass per query is fine.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Book, BookStatus, BorrowRecord, ReaderStats};

// =============================================================================
// Overdue
// =============================================================================

/// How late an overdue book is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverdueSeverity {
    /// More than 30 days late.
    Severe,
    /// 8 to 30 days late.
    Moderate,
    /// Up to 7 days late.
    Mild,
}

impl OverdueSeverity {
    /// Classifies a number of overdue days.
    pub fn from_days(days: i64) -> Self {
        match days {
            d if d > 30 => OverdueSeverity::Severe,
            d if d > 7 => OverdueSeverity::Moderate,
            _ => OverdueSeverity::Mild,
        }
    }
}

/// Count of overdue books per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityBuckets {
    pub severe: usize,
    pub moderate: usize,
    pub mild: usize,
}

/// Borrowed books whose due date is before `today`, in collection order.
pub fn overdue_books(books: &[Book], today: NaiveDate) -> Vec<&Book> {
    books.iter().filter(|b| b.is_overdue(today)).collect()
}

/// Whole days between `due` and `today`.
pub fn overdue_days(due: NaiveDate, today: NaiveDate) -> i64 {
    (today - due).num_days()
}

/// Buckets every overdue book by [`OverdueSeverity`].
pub fn overdue_severity_buckets(books: &[Book], today: NaiveDate) -> SeverityBuckets {
    let mut buckets = SeverityBuckets::default();

    for due in overdue_books(books, today).iter().filter_map(|b| b.due_date()) {
        match OverdueSeverity::from_days(overdue_days(due, today)) {
            OverdueSeverity::Severe => buckets.severe += 1,
            OverdueSeverity::Moderate => buckets.moderate += 1,
            OverdueSeverity::Mild => buckets.mild += 1,
        }
    }

    buckets
}

// =============================================================================
// Readers
// =============================================================================

/// Per-reader borrow counts, most active first.
///
/// ## Counting
/// - Every history record adds one to its reader's `borrow_count`
/// - A borrowed book adds one to its borrower's `current_borrowed`
///
/// Ties keep first-encountered order, visiting each book's history before
/// its current borrower. Readers never seen are absent.
pub fn reader_stats(books: &[Book]) -> Vec<ReaderStats> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut stats: Vec<ReaderStats> = Vec::new();

    let mut entry = |name: &str| -> usize {
        *index.entry(name.to_string()).or_insert_with(|| {
            stats.push(ReaderStats {
                name: name.to_string(),
                borrow_count: 0,
                current_borrowed: 0,
            });
            stats.len() - 1
        })
    };

    let mut borrow_hits = Vec::new();
    let mut current_hits = Vec::new();
    for book in books {
        for record in &book.borrow_history {
            borrow_hits.push(entry(&record.borrower_name));
        }
        if let Some(borrower) = book.borrower_name() {
            current_hits.push(entry(borrower));
        }
    }

    for i in borrow_hits {
        stats[i].borrow_count += 1;
    }
    for i in current_hits {
        stats[i].current_borrowed += 1;
    }

    // sort_by is stable
    stats.sort_by(|a, b| b.borrow_count.cmp(&a.borrow_count));
    stats
}

// =============================================================================
// Catalog
// =============================================================================

/// `(category, count)` pairs in first-encountered order.
pub fn category_distribution(books: &[Book]) -> Vec<(String, usize)> {
    let mut out: Vec<(String, usize)> = Vec::new();
    for book in books {
        match out.iter_mut().find(|(c, _)| *c == book.category) {
            Some((_, count)) => *count += 1,
            None => out.push((book.category.clone(), 1)),
        }
    }
    out
}

/// Distinct categories in first-encountered order.
pub fn categories(books: &[Book]) -> Vec<String> {
    category_distribution(books)
        .into_iter()
        .map(|(category, _)| category)
        .collect()
}

/// Top `n` books by history length; ties keep collection order.
pub fn popular_books(books: &[Book], n: usize) -> Vec<&Book> {
    let mut ranked: Vec<&Book> = books.iter().collect();
    ranked.sort_by(|a, b| b.borrow_history.len().cmp(&a.borrow_history.len()));
    ranked.truncate(n);
    ranked
}

/// Books whose title or author contains `term` (case-insensitive),
/// optionally restricted to one exact category.
///
/// A blank term matches every book.
pub fn search_books<'a>(books: &'a [Book], term: &str, category: Option<&str>) -> Vec<&'a Book> {
    let term = term.trim().to_lowercase();
    books
        .iter()
        .filter(|b| category.map_or(true, |c| b.category == c))
        .filter(|b| {
            term.is_empty()
                || b.title.to_lowercase().contains(&term)
                || b.author.to_lowercase().contains(&term)
        })
        .collect()
}

// =============================================================================
// Library Summary
// =============================================================================

/// Dashboard figures for the whole collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySummary {
    pub total_books: usize,
    pub available: usize,
    pub borrowed: usize,
    pub lost: usize,
    pub overdue: usize,
    pub reserved: usize,
    /// History entries across all books.
    pub total_borrows: usize,
}

pub fn library_summary(books: &[Book], today: NaiveDate) -> LibrarySummary {
    let mut summary = LibrarySummary {
        total_books: books.len(),
        ..Default::default()
    };

    for book in books {
        match book.status() {
            BookStatus::Available => summary.available += 1,
            BookStatus::Borrowed => summary.borrowed += 1,
            BookStatus::Lost => summary.lost += 1,
        }
        if book.is_overdue(today) {
            summary.overdue += 1;
        }
        if book.reserved_by().is_some() {
            summary.reserved += 1;
        }
        summary.total_borrows += book.borrow_history.len();
    }

    summary
}

// =============================================================================
// Borrow Ledger
// =============================================================================

/// One history record together with the book it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub book_id: String,
    pub book_title: String,
    #[serde(flatten)]
    pub record: BorrowRecord,
}

/// Every history record of every book, in collection then history order.
pub fn history_entries(books: &[Book]) -> Vec<HistoryEntry> {
    books
        .iter()
        .flat_map(|book| {
            book.borrow_history.iter().map(move |record| HistoryEntry {
                book_id: book.id.clone(),
                book_title: book.title.clone(),
                record: record.clone(),
            })
        })
        .collect()
}

/// History entries whose book title or borrower contains `term`
/// (case-insensitive). A blank term returns the full ledger.
pub fn search_history(books: &[Book], term: &str) -> Vec<HistoryEntry> {
    let term = term.trim().to_lowercase();
    history_entries(books)
        .into_iter()
        .filter(|e| {
            term.is_empty()
                || e.book_title.to_lowercase().contains(&term)
                || e.record.borrower_name.to_lowercase().contains(&term)
        })
        .collect()
}

/// Aggregate figures over the borrow ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub total_records: usize,
    pub returned: usize,
    pub open: usize,
    pub overdue_open: usize,
    /// Mean days between borrow and return over returned records, rounded
    /// to the nearest whole day (halves round up).
    pub average_loan_days: Option<i64>,
}

pub fn history_summary(books: &[Book], today: NaiveDate) -> HistorySummary {
    let mut summary = HistorySummary::default();
    let mut total_days: i64 = 0;

    for book in books {
        for record in &book.borrow_history {
            summary.total_records += 1;
            match record.return_date {
                Some(returned) => {
                    summary.returned += 1;
                    total_days += (returned - record.borrow_date).num_days();
                }
                None => summary.open += 1,
            }
        }
        if book.is_overdue(today) {
            summary.overdue_open += 1;
        }
    }

    if summary.returned > 0 {
        let mean = total_days as f64 / summary.returned as f64;
        summary.average_loan_days = Some(mean.round() as i64);
    }

    summary
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Library Service
//!
//! The lending engine: applies core transitions to the stored collection.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  borrow / return_book / reserve / ... / import_snapshot                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  write_lock.lock().await        one writer per service at a time       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.load()                   fresh snapshot                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lifecycle::*(&mut books, today)   check, then mutate                  │
//! │       │                                                                 │
//! │       ├── Err ──► nothing written                                      │
//! │       ├── unchanged ──► nothing written                                │
//! │       ▼                                                                 │
//! │  store.replace_all(&books)      atomic                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  events.publish(ReservationReady)   return_book only                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads never take the write lock. Each one sees a single stored snapshot,
//! from before or after any concurrent write.

use std::sync::Arc;

use chrono::NaiveDate;
use libgenius_core::stats::{self, HistoryEntry, HistorySummary, LibrarySummary, SeverityBuckets};
use libgenius_core::{
    lifecycle, transfer, Book, BookFields, CoreError, CoreResult, ImportPolicy, Operation,
    ReaderStats, ReservationReady,
};
use libgenius_db::{Database, RecordStore};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::LibraryConfig;
use crate::error::ServiceResult;
use crate::events::EventBus;

/// Lending engine over a [`RecordStore`].
///
/// ## Usage
/// ```rust,ignore
/// let service = LibraryService::new(Arc::new(MemoryStore::new()));
/// let book = service.create_or_update(BookFields::titled("Dune"), None).await?;
/// service.borrow(&book.id, "Alice").await?;
/// ```
pub struct LibraryService {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    events: EventBus,
    import_policy: ImportPolicy,
    write_lock: Mutex<()>,
}

impl LibraryService {
    /// Creates a service with the system clock, a default event bus and
    /// the strict import policy.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        LibraryService {
            store,
            clock: Arc::new(SystemClock),
            events: EventBus::default(),
            import_policy: ImportPolicy::default(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn with_import_policy(mut self, policy: ImportPolicy) -> Self {
        self.import_policy = policy;
        self
    }

    /// Opens the SQLite store named by `config` and builds a service on it.
    pub async fn open(config: &LibraryConfig) -> ServiceResult<(Self, Database)> {
        let db = Database::new(config.db_config()).await?;
        let service = LibraryService::new(Arc::new(db.books()))
            .with_events(EventBus::new(config.lending.event_capacity))
            .with_import_policy(config.lending.import_policy);

        info!(
            policy = %config.lending.import_policy,
            "Library service ready"
        );
        Ok((service, db))
    }

    /// Receives every `ReservationReady` published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ReservationReady> {
        self.events.subscribe()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn import_policy(&self) -> ImportPolicy {
        self.import_policy
    }

    /// The date the next transition will use.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Runs `apply` on a fresh snapshot under the write lock and stores the
    /// result if anything changed.
    async fn mutate<T, F>(&self, apply: F) -> ServiceResult<T>
    where
        F: FnOnce(&mut Vec<Book>, NaiveDate) -> CoreResult<T>,
    {
        let _guard = self.write_lock.lock().await;

        let mut books = self.store.load().await?;
        let before = books.clone();
        let out = apply(&mut books, self.clock.today())?;

        if books != before {
            self.store.replace_all(&books).await?;
        } else {
            debug!("Snapshot unchanged, skipping write");
        }

        Ok(out)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Every book, in collection order.
    pub async fn list_books(&self) -> ServiceResult<Vec<Book>> {
        Ok(self.store.load().await?)
    }

    pub async fn get_book(&self, id: &str) -> ServiceResult<Book> {
        self.store
            .load()
            .await?
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| CoreError::not_found(Operation::Get, id).into())
    }

    /// Creates a book (`existing_id = None`) or overwrites the descriptive
    /// fields of an existing one.
    pub async fn create_or_update(
        &self,
        fields: BookFields,
        existing_id: Option<&str>,
    ) -> ServiceResult<Book> {
        let book = self
            .mutate(|books, _| lifecycle::create_or_update(books, fields, existing_id))
            .await?;

        match existing_id {
            Some(_) => info!(book_id = %book.id, title = %book.title, "Book updated"),
            None => info!(book_id = %book.id, title = %book.title, "Book created"),
        }
        Ok(book)
    }

    /// Removes a book whatever its status.
    pub async fn delete_book(&self, id: &str) -> ServiceResult<()> {
        let removed = self.mutate(|books, _| lifecycle::delete_book(books, id)).await?;
        info!(book_id = %removed.id, status = %removed.status(), "Book deleted");
        Ok(())
    }

    // =========================================================================
    // Lending
    // =========================================================================

    pub async fn borrow(&self, id: &str, borrower_name: &str) -> ServiceResult<Book> {
        let book = self
            .mutate(|books, today| lifecycle::borrow(books, id, borrower_name, today))
            .await?;

        info!(
            book_id = %book.id,
            borrower = book.borrower_name().unwrap_or_default(),
            due_date = ?book.due_date(),
            "Book borrowed"
        );
        Ok(book)
    }

    /// Returns a book and publishes a `ReservationReady` if someone was
    /// waiting for it.
    pub async fn return_book(&self, id: &str) -> ServiceResult<Book> {
        let receipt = self
            .mutate(|books, today| lifecycle::return_book(books, id, today))
            .await?;

        info!(book_id = %receipt.book.id, "Book returned");

        if let Some(event) = receipt.reservation_ready {
            info!(
                book_id = %event.book_id,
                reader = %event.reader_name,
                "Reserved book is ready for pickup"
            );
            self.events.publish(event);
        }

        Ok(receipt.book)
    }

    pub async fn reserve(&self, id: &str, reader_name: &str) -> ServiceResult<Book> {
        let book = self
            .mutate(|books, _| lifecycle::reserve(books, id, reader_name))
            .await?;

        info!(
            book_id = %book.id,
            reader = book.reserved_by().unwrap_or_default(),
            "Book reserved"
        );
        Ok(book)
    }

    /// Clears a pending reservation. Without one nothing is written.
    pub async fn cancel_reservation(&self, id: &str) -> ServiceResult<Book> {
        let book = self
            .mutate(|books, _| lifecycle::cancel_reservation(books, id))
            .await?;
        info!(book_id = %book.id, "Reservation cancelled");
        Ok(book)
    }

    pub async fn mark_lost(&self, id: &str) -> ServiceResult<Book> {
        let book = self
            .mutate(|books, today| lifecycle::mark_lost(books, id, today))
            .await?;
        info!(book_id = %book.id, "Book reported lost");
        Ok(book)
    }

    pub async fn mark_found(&self, id: &str) -> ServiceResult<Book> {
        let book = self.mutate(|books, _| lifecycle::mark_found(books, id)).await?;
        info!(book_id = %book.id, "Lost book found");
        Ok(book)
    }

    // =========================================================================
    // Bulk Transfer
    // =========================================================================

    /// Pretty-printed JSON array of the whole collection.
    pub async fn export_snapshot(&self) -> ServiceResult<String> {
        let books = self.store.load().await?;
        let blob = transfer::export_snapshot(&books)?;
        info!(count = books.len(), "Collection exported");
        Ok(blob)
    }

    /// Replaces the whole collection with `blob`. Returns the book count.
    ///
    /// A rejected blob leaves the stored collection untouched.
    pub async fn import_snapshot(&self, blob: &str) -> ServiceResult<usize> {
        let policy = self.import_policy;
        let count = self
            .mutate(|books, _| {
                *books = transfer::import_snapshot(blob, policy)?;
                Ok(books.len())
            })
            .await?;

        info!(count, policy = %policy, "Collection imported");
        Ok(count)
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    pub async fn overdue_books(&self) -> ServiceResult<Vec<Book>> {
        let books = self.store.load().await?;
        let today = self.clock.today();
        Ok(stats::overdue_books(&books, today).into_iter().cloned().collect())
    }

    pub async fn overdue_severity(&self) -> ServiceResult<SeverityBuckets> {
        let books = self.store.load().await?;
        Ok(stats::overdue_severity_buckets(&books, self.clock.today()))
    }

    pub async fn reader_stats(&self) -> ServiceResult<Vec<ReaderStats>> {
        Ok(stats::reader_stats(&self.store.load().await?))
    }

    pub async fn category_distribution(&self) -> ServiceResult<Vec<(String, usize)>> {
        Ok(stats::category_distribution(&self.store.load().await?))
    }

    pub async fn categories(&self) -> ServiceResult<Vec<String>> {
        Ok(stats::categories(&self.store.load().await?))
    }

    pub async fn popular_books(&self, n: usize) -> ServiceResult<Vec<Book>> {
        let books = self.store.load().await?;
        Ok(stats::popular_books(&books, n).into_iter().cloned().collect())
    }

    pub async fn library_summary(&self) -> ServiceResult<LibrarySummary> {
        let books = self.store.load().await?;
        Ok(stats::library_summary(&books, self.clock.today()))
    }

    pub async fn search_books(
        &self,
        term: &str,
        category: Option<&str>,
    ) -> ServiceResult<Vec<Book>> {
        let books = self.store.load().await?;
        Ok(stats::search_books(&books, term, category)
            .into_iter()
            .cloned()
            .collect())
    }

    /// The borrow ledger, optionally filtered by title or borrower.
    pub async fn history(&self, term: &str) -> ServiceResult<Vec<HistoryEntry>> {
        Ok(stats::search_history(&self.store.load().await?, term))
    }

    pub async fn history_summary(&self) -> ServiceResult<HistorySummary> {
        let books = self.store.load().await?;
        Ok(stats::history_summary(&books, self.clock.today()))
    }
}

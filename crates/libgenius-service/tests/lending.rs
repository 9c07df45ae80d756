//! End-to-end lending tests against the in-memory and SQLite stores.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use libgenius_core::validation::validate_history;
use libgenius_core::{Book, BookFields, BookStatus, ImportPolicy, ReservationReady};
use libgenius_db::{Database, DbConfig, DbResult, MemoryStore, RecordStore};
use libgenius_service::{ErrorCode, FixedClock, LibraryService};

const SAMPLE_BOOKS: &str = include_str!("../src/bin/sample_books.json");

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Memory store that counts writes.
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    writes: AtomicUsize,
}

impl CountingStore {
    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for CountingStore {
    async fn load(&self) -> DbResult<Vec<Book>> {
        self.inner.load().await
    }

    async fn replace_all(&self, books: &[Book]) -> DbResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.replace_all(books).await
    }

    async fn count(&self) -> DbResult<usize> {
        self.inner.count().await
    }
}

struct Harness {
    service: Arc<LibraryService>,
    clock: Arc<FixedClock>,
    store: Arc<CountingStore>,
}

/// Service with books `b1` (Dune) and `b2` (Solaris), both available.
async fn harness(today: NaiveDate) -> Harness {
    let store = Arc::new(CountingStore::default());
    store
        .replace_all(&[
            Book::new("b1", BookFields::titled("Dune")),
            Book::new("b2", BookFields::titled("Solaris")),
        ])
        .await
        .unwrap();
    store.writes.store(0, Ordering::SeqCst);

    let clock = Arc::new(FixedClock::new(today));
    let service = LibraryService::new(store.clone()).with_clock(clock.clone());

    Harness {
        service: Arc::new(service),
        clock,
        store,
    }
}

fn assert_consistent(books: &[Book]) {
    for book in books {
        validate_history(&book.id, &book.lending, &book.borrow_history)
            .unwrap_or_else(|e| panic!("book {} is inconsistent: {e}", book.id));
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_borrow_available_book_sets_loan_and_history() {
    let h = harness(date(2024, 3, 1)).await;

    let book = h.service.borrow("b1", "Alice").await.unwrap();

    assert_eq!(book.status(), BookStatus::Borrowed);
    assert_eq!(book.borrower_name(), Some("Alice"));
    assert_eq!(book.borrow_date(), Some(date(2024, 3, 1)));
    assert_eq!(book.due_date(), Some(date(2024, 3, 31)));
    assert_eq!(book.borrow_history.len(), 1);
    assert!(book.borrow_history[0].is_open());
    assert_eq!(book.borrow_history[0].borrower_name, "Alice");

    assert_eq!(h.service.get_book("b1").await.unwrap(), book);
    assert_eq!(h.store.writes(), 1);
}

#[tokio::test]
async fn test_reserve_then_return_hands_off_without_reborrowing() {
    let h = harness(date(2024, 3, 1)).await;
    let mut events = h.service.subscribe();

    h.service.borrow("b1", "Alice").await.unwrap();
    let reserved = h.service.reserve("b1", "Bob").await.unwrap();
    assert_eq!(reserved.reserved_by(), Some("Bob"));

    h.clock.advance(9);
    let returned = h.service.return_book("b1").await.unwrap();

    assert_eq!(returned.status(), BookStatus::Available);
    assert_eq!(returned.borrower_name(), None);
    assert_eq!(returned.due_date(), None);
    assert_eq!(returned.reserved_by(), None);
    assert_eq!(returned.borrow_history.len(), 1);
    assert_eq!(
        returned.borrow_history[0].return_date,
        Some(date(2024, 3, 10))
    );

    assert_eq!(
        events.try_recv().unwrap(),
        ReservationReady {
            book_id: "b1".to_string(),
            reader_name: "Bob".to_string(),
        }
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_borrowing_a_borrowed_book_fails_and_changes_nothing() {
    let h = harness(date(2024, 3, 1)).await;
    h.service.borrow("b1", "Alice").await.unwrap();
    let before = h.service.list_books().await.unwrap();
    let writes = h.store.writes();

    let err = h.service.borrow("b1", "Carol").await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::InvalidState);
    assert!(err.to_string().starts_with("borrow failed: book b1 is BORROWED"));
    assert_eq!(h.service.list_books().await.unwrap(), before);
    assert_eq!(h.store.writes(), writes);
}

#[tokio::test]
async fn test_overdue_book_is_bucketed_severe() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::new(date(2023, 12, 2)));
    let service = LibraryService::new(store).with_clock(clock.clone());

    let book = service
        .create_or_update(BookFields::titled("Dune"), None)
        .await
        .unwrap();
    let borrowed = service.borrow(&book.id, "Alice").await.unwrap();
    assert_eq!(borrowed.due_date(), Some(date(2024, 1, 1)));

    clock.set(date(2024, 2, 15));

    let overdue = service.overdue_books().await.unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].id, book.id);

    let buckets = service.overdue_severity().await.unwrap();
    assert_eq!((buckets.severe, buckets.moderate, buckets.mild), (1, 0, 0));
}

#[tokio::test]
async fn test_deleting_unknown_book_fails_and_changes_nothing() {
    let h = harness(date(2024, 3, 1)).await;
    let before = h.service.list_books().await.unwrap();

    let err = h.service.delete_book("nope").await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.to_string(), "delete failed: book nope not found");
    assert_eq!(h.service.list_books().await.unwrap(), before);
    assert_eq!(h.store.writes(), 0);
}

// =============================================================================
// Properties
// =============================================================================

#[tokio::test]
async fn test_status_and_history_stay_consistent_across_a_script() {
    let h = harness(date(2024, 1, 1)).await;
    let s = &h.service;

    s.borrow("b1", "Li").await.unwrap();
    s.reserve("b1", "Wang").await.unwrap();
    assert!(s.reserve("b1", "Zhao").await.is_err());
    assert!(s.reserve("b2", "Zhao").await.is_err());
    h.clock.advance(12);
    s.return_book("b1").await.unwrap();
    s.borrow("b1", "Wang").await.unwrap();
    s.borrow("b2", "Zhao").await.unwrap();
    assert!(s.return_book("b1").await.is_ok());
    assert!(s.return_book("b1").await.is_err());
    s.mark_lost("b2").await.unwrap();
    assert!(s.borrow("b2", "Li").await.is_err());
    s.mark_found("b2").await.unwrap();
    s.borrow("b2", "Li").await.unwrap();

    let books = s.list_books().await.unwrap();
    assert_consistent(&books);

    let b1 = books.iter().find(|b| b.id == "b1").unwrap();
    assert_eq!(b1.status(), BookStatus::Available);
    assert_eq!(b1.borrow_history.len(), 2);

    let b2 = books.iter().find(|b| b.id == "b2").unwrap();
    assert_eq!(b2.borrower_name(), Some("Li"));
    assert_eq!(b2.borrow_history.len(), 2);
    assert!(b2.borrow_history[0].return_date.is_some());
}

#[tokio::test]
async fn test_cancelling_without_reservation_writes_nothing() {
    let h = harness(date(2024, 3, 1)).await;
    h.service.borrow("b1", "Alice").await.unwrap();
    let before = h.service.list_books().await.unwrap();
    let writes = h.store.writes();

    h.service.cancel_reservation("b1").await.unwrap();
    h.service.cancel_reservation("b2").await.unwrap();

    assert_eq!(h.service.list_books().await.unwrap(), before);
    assert_eq!(h.store.writes(), writes);

    h.service.reserve("b1", "Bob").await.unwrap();
    let cancelled = h.service.cancel_reservation("b1").await.unwrap();
    assert_eq!(cancelled.reserved_by(), None);
    assert_eq!(h.store.writes(), writes + 2);
}

#[tokio::test]
async fn test_export_then_import_restores_the_collection() {
    let h = harness(date(2024, 3, 1)).await;
    h.service.borrow("b1", "Alice").await.unwrap();
    h.service.reserve("b1", "Bob").await.unwrap();
    h.service.borrow("b2", "Carol").await.unwrap();
    h.service.return_book("b2").await.unwrap();
    let before = h.service.list_books().await.unwrap();

    let blob = h.service.export_snapshot().await.unwrap();
    h.service.delete_book("b1").await.unwrap();
    h.service.delete_book("b2").await.unwrap();
    assert!(h.service.list_books().await.unwrap().is_empty());

    assert_eq!(h.service.import_snapshot(&blob).await.unwrap(), 2);
    assert_eq!(h.service.list_books().await.unwrap(), before);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_borrows_have_exactly_one_winner() {
    for round in 0..20 {
        let h = harness(date(2024, 3, 1)).await;

        let a = {
            let service = h.service.clone();
            tokio::spawn(async move { service.borrow("b1", "Alice").await })
        };
        let b = {
            let service = h.service.clone();
            tokio::spawn(async move { service.borrow("b1", "Bob").await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let wins = results.iter().filter(|r| r.is_ok()).count();
        let losses: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();

        assert_eq!(wins, 1, "round {round}");
        assert_eq!(losses.len(), 1, "round {round}");
        assert_eq!(losses[0].code(), ErrorCode::InvalidState);

        let book = h.service.get_book("b1").await.unwrap();
        assert_eq!(book.status(), BookStatus::Borrowed);
        assert_eq!(book.borrow_history.len(), 1);
        assert_eq!(h.store.writes(), 1);
    }
}

// =============================================================================
// Catalog, Import and Statistics
// =============================================================================

#[tokio::test]
async fn test_update_keeps_lending_and_history() {
    let h = harness(date(2024, 3, 1)).await;
    h.service.borrow("b1", "Alice").await.unwrap();

    let mut fields = BookFields::titled("Dune (Deluxe)");
    fields.author = "Frank Herbert".to_string();
    let updated = h
        .service
        .create_or_update(fields, Some("b1"))
        .await
        .unwrap();

    assert_eq!(updated.title, "Dune (Deluxe)");
    assert_eq!(updated.borrower_name(), Some("Alice"));
    assert_eq!(updated.borrow_history.len(), 1);

    let err = h
        .service
        .create_or_update(BookFields::titled("X"), Some("missing"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);

    let err = h
        .service
        .create_or_update(BookFields::titled("   "), None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);

    let before = h.service.list_books().await.unwrap();
    let mut wiped = BookFields::titled("Dune");
    wiped.borrow_history = Some(Vec::new());
    let err = h
        .service
        .create_or_update(wiped, Some("b1"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);
    assert_eq!(h.service.list_books().await.unwrap(), before);
}

#[tokio::test]
async fn test_backdated_return_is_rejected_and_export_stays_importable() {
    let h = harness(date(2024, 11, 15)).await;
    h.service.borrow("b1", "Alice").await.unwrap();
    let writes = h.store.writes();

    h.clock.set(date(2024, 3, 2));
    let err = h.service.return_book("b1").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidState);
    let err = h.service.mark_lost("b1").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidState);
    assert_eq!(h.store.writes(), writes);

    h.clock.set(date(2024, 11, 20));
    h.service.return_book("b1").await.unwrap();
    let before = h.service.list_books().await.unwrap();

    let blob = h.service.export_snapshot().await.unwrap();
    assert_eq!(h.service.import_policy(), ImportPolicy::Strict);
    assert_eq!(h.service.import_snapshot(&blob).await.unwrap(), 2);
    assert_eq!(h.service.list_books().await.unwrap(), before);
}

#[tokio::test]
async fn test_malformed_import_leaves_collection_intact() {
    let h = harness(date(2024, 3, 1)).await;
    let before = h.service.list_books().await.unwrap();

    let err = h.service.import_snapshot("{ not a list").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::MalformedInput);

    let dup = r#"[{"id":"x","title":"A","status":"AVAILABLE"},{"id":"x","title":"B","status":"AVAILABLE"}]"#;
    let err = h.service.import_snapshot(dup).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);

    assert_eq!(h.service.list_books().await.unwrap(), before);
    assert_eq!(h.store.writes(), 0);
}

#[tokio::test]
async fn test_permissive_policy_accepts_inconsistent_history() {
    let blob = r#"[{"id":"1","title":"A","status":"AVAILABLE",
                    "borrowHistory":[{"borrowerName":"Ghost","borrowDate":"2024-01-01"}]}]"#;

    let strict = LibraryService::new(Arc::new(MemoryStore::new()));
    assert_eq!(
        strict.import_snapshot(blob).await.unwrap_err().code(),
        ErrorCode::ValidationError
    );

    let permissive = LibraryService::new(Arc::new(MemoryStore::new()))
        .with_import_policy(ImportPolicy::Permissive);
    assert_eq!(permissive.import_snapshot(blob).await.unwrap(), 1);
}

#[tokio::test]
async fn test_sample_collection_statistics() {
    let clock = Arc::new(FixedClock::new(date(2024, 12, 20)));
    let service = LibraryService::new(Arc::new(MemoryStore::new())).with_clock(clock);
    assert_eq!(service.import_snapshot(SAMPLE_BOOKS).await.unwrap(), 5);

    let summary = service.library_summary().await.unwrap();
    assert_eq!(summary.total_books, 5);
    assert_eq!(summary.borrowed, 1);
    assert_eq!(summary.overdue, 1);
    assert_eq!(summary.total_borrows, 8);

    let buckets = service.overdue_severity().await.unwrap();
    assert_eq!((buckets.severe, buckets.moderate, buckets.mild), (0, 0, 1));

    let readers = service.reader_stats().await.unwrap();
    assert_eq!(readers[0].name, "李四");
    assert_eq!(readers[0].borrow_count, 3);
    let zhang = readers.iter().find(|r| r.name == "张三").unwrap();
    assert_eq!((zhang.borrow_count, zhang.current_borrowed), (2, 1));

    let popular = service.popular_books(1).await.unwrap();
    assert_eq!(popular[0].id, "3");

    assert_eq!(
        service.category_distribution().await.unwrap(),
        vec![
            ("技术".to_string(), 2),
            ("科幻".to_string(), 1),
            ("文学".to_string(), 2)
        ]
    );
    assert_eq!(service.search_books("", Some("文学")).await.unwrap().len(), 2);
    assert_eq!(service.history("王五").await.unwrap().len(), 2);

    let history = service.history_summary().await.unwrap();
    assert_eq!(history.open, 1);
    assert_eq!(history.returned, 7);
}

// =============================================================================
// SQLite-backed
// =============================================================================

#[tokio::test]
async fn test_sqlite_store_survives_the_full_lifecycle() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let clock = Arc::new(FixedClock::new(date(2024, 12, 20)));
    let service = LibraryService::new(Arc::new(db.books())).with_clock(clock.clone());
    let mut events = service.subscribe();

    assert_eq!(service.import_snapshot(SAMPLE_BOOKS).await.unwrap(), 5);

    service.reserve("2", "王五").await.unwrap();
    service.borrow("4", "赵六").await.unwrap();
    service.mark_lost("5").await.unwrap();
    clock.advance(1);
    service.return_book("2").await.unwrap();

    let event = events.recv().await.unwrap();
    assert_eq!(event.book_id, "2");
    assert_eq!(event.reader_name, "王五");

    let books = service.list_books().await.unwrap();
    assert_consistent(&books);
    let ids: Vec<&str> = books.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);

    let two = &books[1];
    assert_eq!(two.status(), BookStatus::Available);
    assert_eq!(two.borrow_history[1].return_date, Some(date(2024, 12, 21)));
    assert_eq!(books[3].due_date(), Some(date(2025, 1, 19)));
    assert_eq!(books[4].status(), BookStatus::Lost);

    // A fresh service over the same pool sees the same collection
    let reopened = LibraryService::new(Arc::new(db.books()));
    assert_eq!(reopened.list_books().await.unwrap(), books);
    assert_eq!(db.books().count().await.unwrap(), 5);
}

//! # Record Store
//!
//! The persistence seam used by the lending engine.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load()          → one consistent snapshot, collection order           │
//! │  replace_all(s)  → s becomes the stored snapshot, all or nothing       │
//! │                                                                         │
//! │  A reader never observes a half-written replace.                       │
//! │  Serializing concurrent writers is the caller's job.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use libgenius_core::Book;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::DbResult;

/// Durable storage for the book collection.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns every stored book, order preserved.
    async fn load(&self) -> DbResult<Vec<Book>>;

    /// Atomically replaces the stored collection.
    async fn replace_all(&self, books: &[Book]) -> DbResult<()>;

    /// Number of stored books.
    async fn count(&self) -> DbResult<usize>;
}

/// Process-local store, used by tests and ephemeral setups.
#[derive(Debug, Default)]
pub struct MemoryStore {
    books: RwLock<Vec<Book>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `books`.
    pub fn with_books(books: Vec<Book>) -> Self {
        MemoryStore {
            books: RwLock::new(books),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn load(&self) -> DbResult<Vec<Book>> {
        Ok(self.books.read().await.clone())
    }

    async fn replace_all(&self, books: &[Book]) -> DbResult<()> {
        let mut guard = self.books.write().await;
        *guard = books.to_vec();
        debug!(count = books.len(), "Replaced in-memory snapshot");
        Ok(())
    }

    async fn count(&self) -> DbResult<usize> {
        Ok(self.books.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libgenius_core::BookFields;

    #[tokio::test]
    async fn test_memory_store_replace_and_load() {
        let store = MemoryStore::new();
        assert_eq!(store.count().await.unwrap(), 0);

        let books = vec![
            Book::new("b2", BookFields::titled("Solaris")),
            Book::new("b1", BookFields::titled("Dune")),
        ];
        store.replace_all(&books).await.unwrap();

        assert_eq!(store.load().await.unwrap(), books);
        assert_eq!(store.count().await.unwrap(), 2);

        store.replace_all(&[]).await.unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_is_object_safe() {
        let store: Box<dyn RecordStore> =
            Box::new(MemoryStore::with_books(vec![Book::new("b1", BookFields::titled("Dune"))]));
        assert_eq!(store.count().await.unwrap(), 1);
    }
}

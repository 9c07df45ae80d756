//! # libgenius-db: Record Store for LibGenius
//!
//! This crate persists the book collection. The lending engine only ever
//! needs two things from it: read the whole snapshot, and replace the
//! whole snapshot atomically.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       LibGenius Data Flow                               │
//! │                                                                         │
//! │  LibraryService (borrow, return_book, import, ...)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  libgenius-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  RecordStore  │    │   Database    │    │  Migrations  │  │   │
//! │  │   │  (store.rs)   │    │   (pool.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ MemoryStore   │    │ SqlitePool    │    │ 001_init.sql │  │   │
//! │  │   │ BookRepository│◄───│ books()       │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/libgenius/libgenius.db                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The `RecordStore` trait and the in-memory store
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - SQLite-backed book repository
//!
//! ## Usage
//!
//! ```rust,ignore
//! use libgenius_db::{Database, DbConfig, RecordStore};
//!
//! let db = Database::new(DbConfig::new("libgenius.db")).await?;
//! let books = db.books().load().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::book::BookRepository;
pub use store::{MemoryStore, RecordStore};

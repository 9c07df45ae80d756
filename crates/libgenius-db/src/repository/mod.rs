//! # Repository Module
//!
//! SQLite-backed implementations of [`crate::RecordStore`].
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LibraryService                                                         │
//! │       │                                                                 │
//! │       │  store.load() / store.replace_all(&books)                      │
//! │       ▼                                                                 │
//! │  BookRepository                                                        │
//! │  ├── load(&self)                 books + borrow_records, one tx       │
//! │  ├── replace_all(&self, books)   delete + reinsert, one tx            │
//! │  └── count(&self)                                                      │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`book::BookRepository`] - The book collection and its borrow ledger

pub mod book;

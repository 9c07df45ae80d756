//! # Book Repository
//!
//! Stores the collection in two tables:
//!
//! ```text
//! books           id, position, descriptive columns, status,
//!                 borrower_name?, borrow_date?, due_date?, reserved_by?
//! borrow_records  (book_id, seq) → borrower_name, borrow_date, return_date?
//! ```
//!
//! `position` keeps collection order and `seq` keeps history order.
//! Loading rebuilds the explicit lending variant from the nullable columns
//! and refuses rows that do not describe a legal state.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use libgenius_core::{Book, BookStatus, BorrowRecord, Lending, Loan};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::store::RecordStore;

/// Repository for the book collection.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.books();
/// let mut books = repo.load().await?;
/// repo.replace_all(&books).await?;
/// ```
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: String,
    title: String,
    author: String,
    isbn: String,
    category: String,
    publish_date: String,
    summary: String,
    cover_url: String,
    status: String,
    borrower_name: Option<String>,
    borrow_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    reserved_by: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct RecordRow {
    book_id: String,
    borrower_name: String,
    borrow_date: NaiveDate,
    return_date: Option<NaiveDate>,
}

impl BookRow {
    fn lending(&self) -> DbResult<Lending> {
        let has_loan_columns = self.borrower_name.is_some()
            || self.borrow_date.is_some()
            || self.due_date.is_some()
            || self.reserved_by.is_some();

        match self.status.as_str() {
            "AVAILABLE" | "LOST" if has_loan_columns => Err(DbError::corrupt(
                &self.id,
                format!("{} row carries loan columns", self.status),
            )),
            "AVAILABLE" => Ok(Lending::Available),
            "LOST" => Ok(Lending::Lost),
            "BORROWED" => match (&self.borrower_name, self.borrow_date, self.due_date) {
                (Some(name), Some(borrow_date), Some(due_date)) => Ok(Lending::Borrowed(Loan {
                    borrower_name: name.clone(),
                    borrow_date,
                    due_date,
                    reserved_by: self.reserved_by.clone(),
                })),
                _ => Err(DbError::corrupt(
                    &self.id,
                    "BORROWED row is missing borrower or dates",
                )),
            },
            other => Err(DbError::corrupt(&self.id, format!("unknown status '{other}'"))),
        }
    }

    fn into_book(self, borrow_history: Vec<BorrowRecord>) -> DbResult<Book> {
        let lending = self.lending()?;
        Ok(Book {
            id: self.id,
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            category: self.category,
            publish_date: self.publish_date,
            summary: self.summary,
            cover_url: self.cover_url,
            lending,
            borrow_history,
        })
    }
}

impl BookRepository {
    /// Creates a new BookRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookRepository { pool }
    }
}

#[async_trait]
impl RecordStore for BookRepository {
    /// Reads books and their ledgers inside one transaction, so a
    /// concurrent `replace_all` is seen either fully or not at all.
    async fn load(&self) -> DbResult<Vec<Book>> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT
                id, title, author, isbn, category, publish_date, summary, cover_url,
                status, borrower_name, borrow_date, due_date, reserved_by
            FROM books
            ORDER BY position
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let records = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT book_id, borrower_name, borrow_date, return_date
            FROM borrow_records
            ORDER BY book_id, seq
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut ledgers: HashMap<String, Vec<BorrowRecord>> = HashMap::new();
        for record in records {
            ledgers.entry(record.book_id).or_default().push(BorrowRecord {
                borrower_name: record.borrower_name,
                borrow_date: record.borrow_date,
                return_date: record.return_date,
            });
        }

        let books = rows
            .into_iter()
            .map(|row| {
                let history = ledgers.remove(&row.id).unwrap_or_default();
                row.into_book(history)
            })
            .collect::<DbResult<Vec<Book>>>()?;

        debug!(count = books.len(), "Loaded book snapshot");
        Ok(books)
    }

    /// Deletes and reinserts the whole collection in one transaction.
    async fn replace_all(&self, books: &[Book]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM borrow_records")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM books").execute(&mut *tx).await?;

        for (position, book) in books.iter().enumerate() {
            let loan = book.loan();

            sqlx::query(
                r#"
                INSERT INTO books (
                    id, position, title, author, isbn, category, publish_date, summary,
                    cover_url, status, borrower_name, borrow_date, due_date, reserved_by
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                "#,
            )
            .bind(&book.id)
            .bind(position as i64)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.isbn)
            .bind(&book.category)
            .bind(&book.publish_date)
            .bind(&book.summary)
            .bind(&book.cover_url)
            .bind(book.status().as_str())
            .bind(loan.map(|l| l.borrower_name.as_str()))
            .bind(loan.map(|l| l.borrow_date))
            .bind(loan.map(|l| l.due_date))
            .bind(loan.and_then(|l| l.reserved_by.as_deref()))
            .execute(&mut *tx)
            .await?;

            for (seq, record) in book.borrow_history.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO borrow_records (book_id, seq, borrower_name, borrow_date, return_date)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                )
                .bind(&book.id)
                .bind(seq as i64)
                .bind(&record.borrower_name)
                .bind(record.borrow_date)
                .bind(record.return_date)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(count = books.len(), "Replaced book snapshot");
        Ok(())
    }

    async fn count(&self) -> DbResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }
}

impl BookRepository {
    /// Number of books currently in a given status.
    pub async fn count_by_status(&self, status: BookStatus) -> DbResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE status = ?1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Bulk Transfer
//!
//! Whole-collection export and import as a single JSON array of books.
//!
//! The array layout is the one readers of older LibGenius exports expect:
//! camelCase fields, a `status` tag, lending fields inline with the book.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::Book;
use crate::validation::{validate_history, validate_unique_ids};

/// How strictly imported snapshots are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportPolicy {
    /// Shape and unique ids only.
    Permissive,
    /// Also require every history to agree with its book's lending state.
    #[default]
    Strict,
}

impl ImportPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ImportPolicy::Permissive => "permissive",
            ImportPolicy::Strict => "strict",
        }
    }
}

impl fmt::Display for ImportPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(ImportPolicy::Permissive),
            "strict" => Ok(ImportPolicy::Strict),
            other => Err(format!(
                "unknown import policy '{other}' (expected 'permissive' or 'strict')"
            )),
        }
    }
}

/// Serializes the whole collection, order preserved.
pub fn export_snapshot(books: &[Book]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(books)
}

/// Decodes and checks a snapshot produced by [`export_snapshot`].
///
/// ## Errors
/// - `MalformedInput`: not a JSON array of book records
/// - `Validation(Duplicate)`: two records share an id
/// - `Validation(InvalidHistory)`: under `Strict`, a history disagrees
///   with its lending state
pub fn import_snapshot(blob: &str, policy: ImportPolicy) -> CoreResult<Vec<Book>> {
    let books: Vec<Book> =
        serde_json::from_str(blob).map_err(|e| CoreError::MalformedInput(e.to_string()))?;

    validate_unique_ids(books.iter().map(|b| b.id.as_str()))?;

    if policy == ImportPolicy::Strict {
        for book in &books {
            validate_history(&book.id, &book.lending, &book.borrow_history)?;
        }
    }

    Ok(books)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle;
    use crate::types::{BookFields, BorrowRecord};
    use crate::ValidationError;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<Book> {
        let mut books = vec![
            Book::new("1", BookFields::titled("React")),
            Book::new("2", BookFields::titled("Three Body")),
            Book::new("3", BookFields::titled("Sapiens")),
        ];
        lifecycle::borrow(&mut books, "1", "Li", date(2024, 1, 1)).unwrap();
        lifecycle::return_book(&mut books, "1", date(2024, 1, 9)).unwrap();
        lifecycle::borrow(&mut books, "2", "Zhang", date(2024, 11, 15)).unwrap();
        lifecycle::reserve(&mut books, "2", "Wang").unwrap();
        lifecycle::mark_lost(&mut books, "3", date(2024, 12, 1)).unwrap();
        books
    }

    #[test]
    fn test_round_trip_is_identity() {
        let books = sample();
        let blob = export_snapshot(&books).unwrap();
        assert_eq!(import_snapshot(&blob, ImportPolicy::Strict).unwrap(), books);
    }

    #[test]
    fn test_empty_round_trip() {
        let blob = export_snapshot(&[]).unwrap();
        assert!(import_snapshot(&blob, ImportPolicy::Strict).unwrap().is_empty());
    }

    #[test]
    fn test_export_uses_flat_status_layout() {
        let blob = export_snapshot(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
        assert_eq!(value[1]["status"], "BORROWED");
        assert_eq!(value[1]["dueDate"], "2024-12-15");
        assert_eq!(value[1]["reservedBy"], "Wang");
        assert_eq!(value[0]["borrowHistory"][0]["returnDate"], "2024-01-09");
        assert_eq!(value[2]["status"], "LOST");
    }

    #[test]
    fn test_malformed_input() {
        for blob in ["not json", "{\"id\": \"1\"}", "[{\"title\": \"no id\"}]", "[1, 2]"] {
            assert!(
                matches!(
                    import_snapshot(blob, ImportPolicy::Permissive),
                    Err(CoreError::MalformedInput(_))
                ),
                "{blob} should be malformed"
            );
        }
    }

    #[test]
    fn test_duplicate_ids_rejected_under_both_policies() {
        let blob = r#"[{"id": "1", "title": "A", "status": "AVAILABLE"},
                       {"id": "1", "title": "B", "status": "AVAILABLE"}]"#;
        for policy in [ImportPolicy::Permissive, ImportPolicy::Strict] {
            assert!(matches!(
                import_snapshot(blob, policy),
                Err(CoreError::Validation(ValidationError::Duplicate { .. }))
            ));
        }
    }

    #[test]
    fn test_inconsistent_history_depends_on_policy() {
        let mut book = Book::new("1", BookFields::titled("A"));
        book.borrow_history
            .push(BorrowRecord::open("Ghost", date(2024, 1, 1)));
        let blob = serde_json::to_string(&vec![book]).unwrap();

        assert!(import_snapshot(&blob, ImportPolicy::Permissive).is_ok());
        assert!(matches!(
            import_snapshot(&blob, ImportPolicy::Strict),
            Err(CoreError::Validation(ValidationError::InvalidHistory { .. }))
        ));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("STRICT".parse::<ImportPolicy>().unwrap(), ImportPolicy::Strict);
        assert_eq!(" permissive ".parse::<ImportPolicy>().unwrap(), ImportPolicy::Permissive);
        assert!("lenient".parse::<ImportPolicy>().is_err());
        assert_eq!(ImportPolicy::default(), ImportPolicy::Strict);
    }
}

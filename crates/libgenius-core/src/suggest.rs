//! # Metadata Suggestions
//!
//! Parsing and merging of advisory book metadata returned by an external
//! assistant. The assistant replies in free text that contains a JSON
//! object somewhere inside it.

use serde::{Deserialize, Serialize};

use crate::types::BookFields;

/// Metadata an assistant may fill in for a title. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialBookFields {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub publish_date: Option<String>,
}

impl PartialBookFields {
    /// Returns true if no field carries a value.
    pub fn is_empty(&self) -> bool {
        [
            &self.author,
            &self.category,
            &self.summary,
            &self.isbn,
            &self.publish_date,
        ]
        .iter()
        .all(|f| f.as_deref().map_or(true, |v| v.trim().is_empty()))
    }

    /// Overwrites the matching fields of `fields` with every non-blank
    /// suggestion. Title, cover and history are never touched.
    pub fn merge_into(&self, fields: &mut BookFields) {
        fn take(target: &mut String, value: &Option<String>) {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                *target = v.to_string();
            }
        }

        take(&mut fields.author, &self.author);
        take(&mut fields.category, &self.category);
        take(&mut fields.summary, &self.summary);
        take(&mut fields.isbn, &self.isbn);
        take(&mut fields.publish_date, &self.publish_date);
    }
}

/// Extracts the outermost `{...}` span from `text` and decodes it.
///
/// Anything that does not yield an object with at least one filled field
/// is treated as "no suggestion".
pub fn parse_suggestion(text: &str) -> Option<PartialBookFields> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }

    serde_json::from_str::<PartialBookFields>(&text[start..=end])
        .ok()
        .filter(|s| !s.is_empty())
}

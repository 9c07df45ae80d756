//! # Metadata Suggestion Seam
//!
//! An external assistant that proposes author, category, summary, ISBN and
//! publish date for a title. Purely advisory: callers merge the result into
//! a catalog payload themselves, and the lending engine never calls it.

use async_trait::async_trait;
use libgenius_core::suggest::{parse_suggestion, PartialBookFields};
use thiserror::Error;
use tracing::{debug, warn};

/// Failures of a metadata suggester. Never surfaced as a lending error.
#[derive(Debug, Error)]
pub enum SuggestError {
    /// The assistant could not be reached or refused the request.
    #[error("Suggestion service unavailable: {0}")]
    Unavailable(String),

    /// The assistant answered with nothing usable.
    #[error("Suggestion reply contained no metadata")]
    NoMetadata,
}

/// Proposes metadata for a book title.
#[async_trait]
pub trait MetadataSuggester: Send + Sync {
    async fn suggest_book_metadata(&self, title: &str) -> Result<PartialBookFields, SuggestError>;
}

/// Runs `suggester` and degrades every failure to `None`.
pub async fn suggest_or_none(
    suggester: &dyn MetadataSuggester,
    title: &str,
) -> Option<PartialBookFields> {
    let title = title.trim();
    if title.is_empty() {
        return None;
    }

    match suggester.suggest_book_metadata(title).await {
        Ok(fields) => {
            debug!(title = %title, "Metadata suggestion received");
            Some(fields)
        }
        Err(e) => {
            warn!(title = %title, error = %e, "Metadata suggestion failed");
            None
        }
    }
}

/// Adapts any free-text responder into a [`MetadataSuggester`].
///
/// The responder's reply is scanned for an embedded JSON object, the way
/// chat-style assistants usually answer.
pub struct TextReplySuggester<F> {
    respond: F,
}

impl<F> TextReplySuggester<F>
where
    F: Fn(&str) -> Result<String, SuggestError> + Send + Sync,
{
    pub fn new(respond: F) -> Self {
        TextReplySuggester { respond }
    }
}

#[async_trait]
impl<F> MetadataSuggester for TextReplySuggester<F>
where
    F: Fn(&str) -> Result<String, SuggestError> + Send + Sync,
{
    async fn suggest_book_metadata(&self, title: &str) -> Result<PartialBookFields, SuggestError> {
        let reply = (self.respond)(title)?;
        parse_suggestion(&reply).ok_or(SuggestError::NoMetadata)
    }
}

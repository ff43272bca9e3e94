use std::path::PathBuf;
use thiserror::Error;

/// Conditions the deck pipeline must be able to tell apart.
///
/// They are raised inside `anyhow::Error` values; callers that need to branch
/// on one use `err.downcast_ref::<DeckError>()`.
#[derive(Debug, Error)]
pub enum DeckError {
    /// A track or playlist reference that does not contain a recognizable id.
    #[error("malformed identifier: '{0}'")]
    MalformedIdentifier(String),
    /// The external catalog was requested but is not configured.
    #[error("external lookup unavailable: {0}")]
    ExternalLookupUnavailable(String),
    /// Front and back documents cannot be paired page by page.
    #[error("page count mismatch: front document has {front} pages, back document has {back}")]
    PageCountMismatch { front: usize, back: usize },
    /// The identity cache could not be flushed to disk.
    #[error("failed to write identity cache {}", .path.display())]
    CacheWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

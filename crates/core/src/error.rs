//! Unified error types for the imago cache core.
//!
//! Every fault the crawl pipeline can raise is a variant here so the
//! refresh scheduler can contain all of them at the cycle boundary.

/// Unified error types for the imago mirror.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Authentication exchange failed or the API rejected the key.
    #[error("AUTH_FAILED: {0}")]
    Auth(String),

    /// A page document was missing one of its required fields.
    #[error("INVALID_PAGE: {0}")]
    InvalidPage(String),

    /// A fetch exhausted its bounded retry attempts.
    #[error("RETRIES_EXHAUSTED: {attempts} attempts for {url}")]
    RetriesExhausted { url: String, attempts: u32 },

    /// HTTP error response.
    #[error("HTTP_ERROR: status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// Network-level failure (connect, TLS, timeout, body read).
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// Response body was not the JSON document we expected.
    #[error("PARSE_ERROR: {0}")]
    Parse(String),

    /// A URL could not be parsed or has no usable trailing segment.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Local storage fault while writing an asset.
    #[error("STORAGE_ERROR: {path}: {message}")]
    Storage { path: String, message: String },

    /// An index entry referenced an identifier absent from the item store.
    ///
    /// This is the invariant violation from the data model: it indicates a
    /// bug in the indexing path, not a bad query.
    #[error("MISSING_ITEM: id {0} is indexed but not stored")]
    MissingItem(u64),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

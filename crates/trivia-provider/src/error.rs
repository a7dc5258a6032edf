//! Error types for the provider layer.

/// Why a question could not be fetched.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The category name has no provider id. A configuration mistake, not a
    /// transient failure.
    #[error("no provider category id for {0:?}")]
    UnknownCategory(String),

    /// The request never produced a response (DNS, connect, timeout, body
    /// read).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success HTTP status.
    #[error("provider returned HTTP {0}")]
    Status(u16),

    /// The provider answered but had nothing usable (non-zero response code
    /// or an empty result list).
    #[error("provider returned no results (response code {0})")]
    NoResults(i64),

    /// The body was not the JSON shape we expect.
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

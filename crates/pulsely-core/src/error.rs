use thiserror::Error;

/// Error type for the core layer.
///
/// Feeds never surface these to callers directly — they are flattened
/// into display strings stored on the feed state — but commands and
/// other programmatic consumers get the typed form.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An operation that requires a signed-in session ran without one.
    #[error("Not authenticated -- sign in first")]
    NotAuthenticated,

    /// Silent token retrieval came back empty; the request was never sent.
    #[error("No access token available")]
    NoAccessToken,

    /// Anything the API crate reported (transport, HTTP, provider, IO).
    #[error(transparent)]
    Api(#[from] pulsely_api::Error),
}

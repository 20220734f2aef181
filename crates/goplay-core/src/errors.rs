//! Error types for the fetch and compile round trips
//!
//! Every variant corresponds to one point where a request can fail. A program
//! that fails to compile on the remote side is not an error here; that outcome
//! is carried by [`crate::CompileResult::errors`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaygroundError {
    #[error("unable to fetch link: {0}")]
    FetchTransport(#[source] reqwest::Error),
    #[error("unable to find code block on page")]
    CodeNotFound,
    #[error("unable to create request: {0}")]
    RequestConstruction(#[source] reqwest::Error),
    #[error("unable to perform request: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("unable to parse response: {0}")]
    Decode(#[source] serde_json::Error),
    /// The response body could not be drained to completion.
    ///
    /// reqwest releases the connection only once the body has been read to
    /// the end, so a stream that breaks mid-read (e.g. a short
    /// `Content-Length`) lands here rather than in `Decode`. `Decode` is
    /// reserved for bodies that arrived whole but are not the expected JSON.
    #[error("unable to close response body: {0}")]
    ResourceCleanup(#[source] reqwest::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PlaygroundError>;

impl PlaygroundError {
    /// True for failures raised before or while talking to the fetch target.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            PlaygroundError::FetchTransport(_) | PlaygroundError::CodeNotFound
        )
    }
}

//! Errors returned by [`ApiClient`](crate::ApiClient) calls.

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect failure, timeout, reset).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-2xx status. `message` is the `error`
    /// field of the JSON body when one could be read.
    #[error("API request failed with status {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Server { status: u16, message: Option<String> },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}


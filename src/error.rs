//! Error types for the chat backend API.

use reqwest::StatusCode;
use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Everything that can go wrong talking to the backend.
///
/// `Transport` and `Status` are both transport failures; `Parse` covers a body
/// that arrived but could not be decoded. The sync client logs all of them the
/// same way. The URL variants only come up while building the client.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response body: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid API url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("API url `{0}` cannot carry a path")]
    NotABaseUrl(String),
}

impl ApiError {
    pub fn status(status: StatusCode, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }
}

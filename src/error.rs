//! Error kinds surfaced by the catalog client and the image cache.

use std::sync::Arc;

use thiserror::Error;

/// Failures of the data-access layer.
///
/// The type is `Clone` so a single in-flight image fetch can hand the same
/// outcome to every caller waiting on it.
#[derive(Debug, Clone, Error)]
pub enum BookStoreError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid server response: {0}")]
    InvalidServerResponse(String),

    #[error("invalid image data: {0}")]
    InvalidImageData(String),

    #[error("failed to decode catalog response: {0}")]
    DecodeFailure(#[source] Arc<serde_json::Error>),
}

impl BookStoreError {
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        BookStoreError::InvalidServerResponse(err.to_string())
    }

    pub(crate) fn from_status(status: reqwest::StatusCode) -> Self {
        BookStoreError::InvalidServerResponse(format!("unexpected status {status}"))
    }
}

impl From<serde_json::Error> for BookStoreError {
    fn from(err: serde_json::Error) -> Self {
        BookStoreError::DecodeFailure(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, BookStoreError>;

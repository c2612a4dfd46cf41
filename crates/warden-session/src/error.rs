//! Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("HTTP error: {0}")]
    Http(#[from] warden_http::HttpError),

    #[error("Storage error: {0}")]
    Storage(#[from] warden_storage::StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed identity payload: {0}")]
    Identity(#[source] serde_json::Error),

    #[error("User watch closed")]
    WatchClosed,

    #[error("Timed out waiting for user")]
    WaitTimeout,
}

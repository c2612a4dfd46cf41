//! Transport error types
//!
//! The taxonomy matters to the recovery protocol: only `Status { 401, .. }`
//! feeds the retry/logout path, and `Network` must never be mistaken for it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpError {
    /// No response at all (connect failure, timeout, DNS).
    #[error("Network unreachable: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {}", status_detail(.title, .message))]
    Status {
        status: u16,
        title: Option<String>,
        message: Option<String>,
    },

    #[error("Response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Client build error: {0}")]
    Build(String),
}

fn status_detail<'a>(title: &'a Option<String>, message: &'a Option<String>) -> &'a str {
    message
        .as_deref()
        .or(title.as_deref())
        .unwrap_or("request failed")
}

impl HttpError {
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_network(&self) -> bool {
        matches!(self, HttpError::Network(_))
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        // Statuses are handled from the response itself; a reqwest error
        // reaching here means no usable response was received.
        HttpError::Network(e.to_string())
    }
}

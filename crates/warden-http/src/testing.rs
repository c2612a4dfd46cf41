//! Scripted transport for protocol tests
//!
//! Plays back a fixed sequence of responses and records what was sent.
//! Used by this crate's tests and by warden-session's.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::request::{ApiRequest, ApiResponse};
use crate::transport::Transport;
use crate::{HttpError, Result};

pub type Scripted = Result<ApiResponse>;

pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ApiRequest>>,
    sent: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Scripted>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            sent: AtomicUsize::new(0),
        }
    }

    /// Number of requests sent so far.
    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    /// Paths of every request sent, in order.
    pub fn paths(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.path.clone()).collect()
    }

    /// The nth request sent, if any.
    pub fn request(&self, n: usize) -> Option<ApiRequest> {
        self.requests.lock().get(n).cloned()
    }

    /// Append more responses to the script.
    pub fn push(&self, response: Scripted) {
        self.responses.lock().push_back(response);
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, req: &ApiRequest) -> Result<ApiResponse> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(req.clone());

        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::Network("script exhausted".into())))
    }
}

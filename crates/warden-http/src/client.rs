//! API client with the unauthorized-recovery protocol
//!
//! Every 401 gets one transparent resend of the same request. If the resend
//! is also a 401 on a non-auth endpoint while the session still believes it
//! is authenticated, the session hook fires at most once per episode, no
//! matter how many requests fail together. Errors always reach the caller;
//! the protocol only adds a side effect on the way out.

use async_trait::async_trait;
use parking_lot::RwLock;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use url::Url;

use crate::request::{ApiRequest, ApiResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::{HttpError, Result};

/// Endpoints whose own 401s must not trigger session invalidation.
static AUTH_ENDPOINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"auth/(current|logout|login)").unwrap());

/// Session-side collaborator consulted when an invalidation episode starts.
#[async_trait]
pub trait SessionHook: Send + Sync {
    /// Whether the session currently believes it is authenticated.
    fn is_authenticated(&self) -> bool;

    /// Expired credentials confirmed; the session should invalidate itself.
    async fn on_unauthorized(&self);
}

pub struct ApiClient {
    transport: Arc<dyn Transport>,
    hook: RwLock<Option<Arc<dyn SessionHook>>>,
    /// Single-flight latch for the invalidation side effect.
    invalidating: AtomicBool,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            hook: RwLock::new(None),
            invalidating: AtomicBool::new(false),
        }
    }

    pub fn with_base_url(base_url: Url, timeout: Duration) -> Result<Self> {
        let transport = ReqwestTransport::new(base_url, timeout)?;
        Ok(Self::new(Arc::new(transport)))
    }

    pub fn set_session_hook(&self, hook: Arc<dyn SessionHook>) {
        *self.hook.write() = Some(hook);
    }

    /// Whether an invalidation episode is currently running.
    pub fn invalidating(&self) -> bool {
        self.invalidating.load(Ordering::SeqCst)
    }

    pub async fn execute(&self, req: ApiRequest) -> Result<ApiResponse> {
        // Network failures propagate untouched: no retry, no logout.
        let mut response = self.transport.send(&req).await?;

        if response.status == 401 {
            tracing::debug!(path = %req.path, "401 response, retrying once");
            response = self.transport.send(&req).await?;

            if response.status == 401 {
                self.maybe_invalidate(&req.path).await;
                return Err(Self::status_error(response));
            }
        }

        if !response.is_success() {
            return Err(Self::status_error(response));
        }

        Ok(response)
    }

    /// Escalate a twice-failed 401 to session invalidation, unless the
    /// failing endpoint is itself an auth endpoint, the session never
    /// thought it was authenticated, or another episode is already running.
    async fn maybe_invalidate(&self, path: &str) {
        if AUTH_ENDPOINT.is_match(path) {
            return;
        }

        let hook = match self.hook.read().clone() {
            Some(hook) => hook,
            None => return,
        };

        if !hook.is_authenticated() {
            return;
        }

        if self
            .invalidating
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            // Re-check under the latch: a finished episode has already
            // flipped the session to anonymous.
            if hook.is_authenticated() {
                tracing::info!(path = %path, "Credentials expired, invalidating session");
                hook.on_unauthorized().await;
            }
            self.invalidating.store(false, Ordering::SeqCst);
        }
    }

    fn status_error(response: ApiResponse) -> HttpError {
        let (title, message) = match &response.body {
            Some(Value::Object(map)) => (
                map.get("title").and_then(Value::as_str).map(String::from),
                map.get("message").and_then(Value::as_str).map(String::from),
            ),
            _ => (None, None),
        };

        HttpError::Status {
            status: response.status,
            title,
            message,
        }
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.execute(ApiRequest::get(path)).await
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        self.execute(ApiRequest::post(path).json(body)?).await
    }

    /// POST with no body, for endpoints that take none (e.g. logout).
    pub async fn post_empty(&self, path: &str) -> Result<ApiResponse> {
        self.execute(ApiRequest::post(path)).await
    }

    pub async fn put<T: Serialize>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        self.execute(ApiRequest::put(path).json(body)?).await
    }

    pub async fn patch<T: Serialize>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        self.execute(ApiRequest::patch(path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.execute(ApiRequest::delete(path)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Scripted, ScriptedTransport};
    use std::sync::atomic::AtomicUsize;

    struct CountingHook {
        authenticated: AtomicBool,
        fired: AtomicUsize,
    }

    impl CountingHook {
        fn new(authenticated: bool) -> Arc<Self> {
            Arc::new(Self {
                authenticated: AtomicBool::new(authenticated),
                fired: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SessionHook for CountingHook {
        fn is_authenticated(&self) -> bool {
            self.authenticated.load(Ordering::SeqCst)
        }

        async fn on_unauthorized(&self) {
            // Mirrors logout: the session stops believing it is authenticated.
            self.authenticated.store(false, Ordering::SeqCst);
            self.fired.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn ok(body: Value) -> Scripted {
        Ok(ApiResponse {
            status: 200,
            body: Some(body),
        })
    }

    fn status(code: u16) -> Scripted {
        Ok(ApiResponse {
            status: code,
            body: None,
        })
    }

    fn client_with(responses: Vec<Scripted>) -> (ApiClient, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new(responses));
        (ApiClient::new(transport.clone()), transport)
    }

    #[tokio::test]
    async fn test_success_passthrough() {
        let (client, transport) = client_with(vec![ok(serde_json::json!({"id": 1}))]);

        let response = client.get("transactions").await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(transport.sent(), 1);
    }

    #[tokio::test]
    async fn test_single_retry_recovers() {
        let (client, transport) =
            client_with(vec![status(401), ok(serde_json::json!({"id": 1}))]);
        let hook = CountingHook::new(true);
        client.set_session_hook(hook.clone());

        let response = client.get("transactions").await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(transport.sent(), 2);
        assert_eq!(hook.fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_401_invalidates_once() {
        let (client, transport) = client_with(vec![status(401), status(401)]);
        let hook = CountingHook::new(true);
        client.set_session_hook(hook.clone());

        let err = client.get("transactions").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(transport.sent(), 2);
        assert_eq!(hook.fired.load(Ordering::SeqCst), 1);
        assert!(!client.invalidating());
    }

    #[tokio::test]
    async fn test_latch_dedupes_concurrent_failures() {
        // Three requests, each failing 401 twice.
        let responses: Vec<Scripted> = (0..6).map(|_| status(401)).collect();
        let (client, _) = client_with(responses);
        let hook = CountingHook::new(true);
        client.set_session_hook(hook.clone());

        let client = Arc::new(client);
        let mut handles = Vec::new();
        for _ in 0..3 {
            let client = Arc::clone(&client);
            handles.push(tokio::spawn(
                async move { client.get("transactions").await },
            ));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_err());
        }

        assert_eq!(hook.fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_network_failure_bypasses_protocol() {
        let (client, transport) =
            client_with(vec![Err(HttpError::Network("connection refused".into()))]);
        let hook = CountingHook::new(true);
        client.set_session_hook(hook.clone());

        let err = client.get("transactions").await.unwrap_err();
        assert!(err.is_network());
        // No retry, no hook.
        assert_eq!(transport.sent(), 1);
        assert_eq!(hook.fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_network_failure_during_retry_passes_through() {
        let (client, transport) = client_with(vec![
            status(401),
            Err(HttpError::Network("connection reset".into())),
        ]);
        let hook = CountingHook::new(true);
        client.set_session_hook(hook.clone());

        let err = client.get("transactions").await.unwrap_err();
        assert!(err.is_network());
        assert_eq!(transport.sent(), 2);
        assert_eq!(hook.fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_auth_endpoint_never_invalidates() {
        let (client, _) = client_with(vec![status(401), status(401)]);
        let hook = CountingHook::new(true);
        client.set_session_hook(hook.clone());

        let err = client
            .post("auth/login", &serde_json::json!({"email": "a@b.com"}))
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(hook.fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_anonymous_session_never_invalidates() {
        let (client, _) = client_with(vec![status(401), status(401)]);
        let hook = CountingHook::new(false);
        client.set_session_hook(hook.clone());

        let err = client.get("transactions").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(hook.fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_other_statuses_propagate_unchanged() {
        let (client, transport) = client_with(vec![Ok(ApiResponse {
            status: 422,
            body: Some(serde_json::json!({
                "title": "Validation failed",
                "message": "email is required"
            })),
        })]);
        let hook = CountingHook::new(true);
        client.set_session_hook(hook.clone());

        let err = client.get("accounts").await.unwrap_err();
        match err {
            HttpError::Status {
                status,
                title,
                message,
            } => {
                assert_eq!(status, 422);
                assert_eq!(title.as_deref(), Some("Validation failed"));
                assert_eq!(message.as_deref(), Some("email is required"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(transport.sent(), 1);
        assert_eq!(hook.fired.load(Ordering::SeqCst), 0);
    }
}

//! Session Manager
//!
//! One instance per client, cheap to clone (shared state behind `Arc`).
//! Mirrors the persisted `authenticated` flag on startup and keeps it in
//! sync with every transition. Registered as the transport's session hook
//! so a confirmed credential expiry funnels into `logout_user`.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use warden_http::{ApiClient, ApiRequest, ApiResponse, SessionHook};
use warden_storage::PreferenceStore;

use crate::error::SessionError;
use crate::models::{AuthForm, User};
use crate::router::Router;
use crate::session::{SessionPhase, SessionState};
use crate::Result;

/// Preference key holding the persisted authenticated flag.
pub const AUTHENTICATED_KEY: &str = "authenticated";

/// Preference keys that survive the logout wipe.
pub const DURABLE_KEYS: &[&str] = &["theme", "accent"];

const AUTH_PREFIX: &str = "auth";

#[derive(Clone)]
pub struct SessionManager {
    client: Arc<ApiClient>,
    store: PreferenceStore,
    router: Arc<dyn Router>,
    state: Arc<RwLock<SessionState>>,
    /// Observed by `wait_for_user`.
    user_tx: watch::Sender<Option<User>>,
}

impl SessionManager {
    /// Build a manager seeded from the persisted authenticated flag.
    pub fn new(
        client: Arc<ApiClient>,
        store: PreferenceStore,
        router: Arc<dyn Router>,
    ) -> Result<Self> {
        let authenticated = store.get_bool(AUTHENTICATED_KEY)?;
        let (user_tx, _) = watch::channel(None);

        Ok(Self {
            client,
            store,
            router,
            state: Arc::new(RwLock::new(SessionState {
                authenticated,
                user: None,
                initialized: false,
            })),
            user_tx,
        })
    }

    /// Register this manager as the transport's session hook.
    pub fn install_hook(&self) {
        self.client.set_session_hook(Arc::new(self.clone()));
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    fn route(&self, endpoint: &str) -> String {
        format!("{AUTH_PREFIX}/{endpoint}")
    }

    pub async fn login(&self, form: &AuthForm) -> Result<ApiResponse> {
        let response = self.client.post(&self.route("login"), form).await?;
        self.init().await;
        Ok(response)
    }

    /// Register a new account, optionally bound to a pending invitation.
    /// No local state change; the caller still logs in afterwards.
    pub async fn sign_up(
        &self,
        form: &AuthForm,
        invitation_id: Option<i64>,
    ) -> Result<ApiResponse> {
        let mut body = serde_json::to_value(form)?;
        if let (Some(id), Some(map)) = (invitation_id, body.as_object_mut()) {
            map.insert("invitation_id".to_string(), id.into());
        }

        let request = ApiRequest::post(self.route("signup")).json_value(body);
        Ok(self.client.execute(request).await?)
    }

    pub async fn resend_confirmation_email(&self, email: Option<&str>) -> Result<ApiResponse> {
        let body = serde_json::json!({ "email": email });
        Ok(self
            .client
            .post(&self.route("resend-confirmation-email"), &body)
            .await?)
    }

    pub async fn request_password_reset(&self, email: Option<&str>) -> Result<ApiResponse> {
        let body = serde_json::json!({ "email": email });
        Ok(self
            .client
            .post(&self.route("request-password-reset"), &body)
            .await?)
    }

    pub async fn reset_password(&self, form: &AuthForm) -> Result<ApiResponse> {
        Ok(self.client.post(&self.route("reset-password"), form).await?)
    }

    /// Fetch the current identity (with secrets/role data). An empty
    /// payload means the server no longer recognizes us; with `should_set`
    /// that escalates to a full logout.
    pub async fn get_auth_user(&self, should_set: bool) -> Result<Option<User>> {
        let request = ApiRequest::get(self.route("current")).query("withSecrets", "true");
        let response = self.client.execute(request).await?;

        if response.is_empty() {
            if should_set {
                self.logout_user().await?;
            }
            return Ok(None);
        }

        let user: User = serde_json::from_value(response.body.unwrap_or(Value::Null))
            .map_err(SessionError::Identity)?;

        if should_set {
            self.set_user(user.clone());
        }

        Ok(Some(user))
    }

    pub fn set_user(&self, user: User) {
        self.state.write().user = Some(user.clone());
        self.user_tx.send_replace(Some(user));
    }

    pub fn set_authenticated(&self, status: bool) -> Result<()> {
        self.state.write().authenticated = status;
        self.store.set_bool(AUTHENTICATED_KEY, status)?;
        Ok(())
    }

    /// Confirm (or roll back) the persisted authenticated flag. The flag
    /// is set before the confirming fetch so a reload doesn't flicker to
    /// the login view; any failure rolls both flags back.
    ///
    /// Returns whether the session ended up initialized. Failures are
    /// encoded in state, not raised.
    pub async fn init(&self) -> bool {
        if let Err(e) = self.set_authenticated(true) {
            tracing::warn!(error = %e, "Failed to persist authenticated flag");
        }

        match self.get_auth_user(true).await {
            Ok(Some(user)) => {
                self.state.write().initialized = true;
                tracing::info!(user_id = user.id, "Session initialized");
                true
            }
            Ok(None) => {
                self.reset_flags();
                false
            }
            Err(e) => {
                tracing::debug!(error = %e, "Session init failed");
                self.reset_flags();
                false
            }
        }
    }

    fn reset_flags(&self) {
        if let Err(e) = self.set_authenticated(false) {
            tracing::warn!(error = %e, "Failed to persist authenticated flag");
        }
        self.state.write().initialized = false;
    }

    /// Local-only logout: clear session state, wipe preferences except the
    /// durable keys, redirect to the login view. No network call.
    pub fn logout(&self) -> Result<()> {
        {
            let mut state = self.state.write();
            state.user = None;
            state.authenticated = false;
            state.initialized = false;
        }
        self.user_tx.send_replace(None);

        self.store.clear_preserving(DURABLE_KEYS)?;

        tracing::info!("Logged out, session cleared");
        self.router.push("/login");
        Ok(())
    }

    /// Logout with best-effort server notification: the server call may
    /// fail, local logout proceeds regardless.
    pub async fn logout_user(&self) -> Result<()> {
        if let Err(e) = self.client.post_empty(&self.route("logout")).await {
            tracing::warn!(error = %e, "Server logout failed, continuing locally");
        }
        self.logout()
    }

    /// Current user if populated, otherwise suspend until it is. Dropping
    /// the future cancels the wait.
    pub async fn wait_for_user(&self) -> Result<User> {
        let mut rx = self.user_tx.subscribe();

        if let Some(user) = rx.borrow().clone() {
            return Ok(user);
        }

        loop {
            rx.changed().await.map_err(|_| SessionError::WatchClosed)?;
            let user = rx.borrow_and_update().clone();
            if let Some(user) = user {
                return Ok(user);
            }
        }
    }

    pub async fn wait_for_user_timeout(&self, timeout: Duration) -> Result<User> {
        tokio::time::timeout(timeout, self.wait_for_user())
            .await
            .map_err(|_| SessionError::WaitTimeout)?
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().authenticated
    }

    pub fn is_initialized(&self) -> bool {
        self.state.read().initialized
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.read().user.clone()
    }

    pub fn is_validated(&self) -> bool {
        self.state
            .read()
            .user
            .as_ref()
            .is_some_and(User::is_validated)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role("admin")
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(
            self.state.read().user.as_ref().and_then(User::role_name),
            Some("super-admin")
        )
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.state
            .read()
            .user
            .as_ref()
            .is_some_and(|u| u.has_role(role))
    }

    pub fn has_permission(&self, perms: &[&str]) -> bool {
        self.state
            .read()
            .user
            .as_ref()
            .is_some_and(|u| u.has_permission(perms))
    }

    pub fn phase(&self) -> SessionPhase {
        if self.client.invalidating() {
            return SessionPhase::Invalidating;
        }

        let state = self.state.read();
        match (state.authenticated, state.initialized) {
            (true, true) => SessionPhase::Authenticated,
            (true, false) => SessionPhase::Authenticating,
            _ => SessionPhase::Anonymous,
        }
    }
}

#[async_trait]
impl SessionHook for SessionManager {
    fn is_authenticated(&self) -> bool {
        self.state.read().authenticated
    }

    async fn on_unauthorized(&self) {
        if let Err(e) = self.logout_user().await {
            tracing::error!(error = %e, "Forced logout failed");
        }
    }
}

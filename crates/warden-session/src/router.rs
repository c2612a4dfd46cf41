//! Routing collaborator and navigation guard policy

use parking_lot::Mutex;

use crate::manager::SessionManager;

/// Programmatic navigation, implemented by whatever hosts the SDK.
pub trait Router: Send + Sync {
    fn push(&self, path: &str);
}

/// Router that goes nowhere, for headless use.
#[derive(Debug, Default)]
pub struct NoopRouter;

impl Router for NoopRouter {
    fn push(&self, _path: &str) {}
}

/// Router that records every navigation, for tests.
#[derive(Debug, Default)]
pub struct RecordingRouter {
    pushed: Mutex<Vec<String>>,
}

impl RecordingRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pushed(&self) -> Vec<String> {
        self.pushed.lock().clone()
    }
}

impl Router for RecordingRouter {
    fn push(&self, path: &str) {
        self.pushed.lock().push(path.to_string());
    }
}

/// Access policy attached to a route.
#[derive(Debug, Clone, Default)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub guest_only: bool,
    /// `Some(false)` marks routes reserved for users who have not yet
    /// confirmed their email (the confirm-email page).
    pub email_confirmed: Option<bool>,
    /// Allow if the user holds ANY of these.
    pub perms_any: Vec<String>,
    /// Allow only if the user holds ALL of these.
    pub perms_all: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
}

/// Navigation guard. Lazily runs `init` the first time an authenticated
/// session hits a protected route after a reload.
pub async fn guard(meta: &RouteMeta, session: &SessionManager) -> GuardDecision {
    if meta.requires_auth && session.is_authenticated() && !session.is_initialized() {
        session.init().await;
    }

    if meta.requires_auth && !session.is_authenticated() {
        return GuardDecision::Redirect("/login");
    }

    if meta.guest_only && session.is_authenticated() {
        return GuardDecision::Redirect("/");
    }

    if meta.email_confirmed == Some(false) && session.is_validated() {
        return GuardDecision::Redirect("/");
    }

    if !meta.perms_any.is_empty() {
        let any = meta
            .perms_any
            .iter()
            .any(|p| session.has_permission(&[p.as_str()]));
        if !any {
            return GuardDecision::Redirect("/");
        }
    }

    if !meta.perms_all.is_empty() {
        let all: Vec<&str> = meta.perms_all.iter().map(String::as_str).collect();
        if !session.has_permission(&all) {
            return GuardDecision::Redirect("/");
        }
    }

    GuardDecision::Allow
}

//! Session state

use crate::models::User;

/// Client-side record of whether a user is logged in and who they are.
///
/// `initialized` means a user fetch has completed since the last reset; it
/// does not imply `authenticated` (the fetch may have failed and reset
/// both).
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Mirrors the persisted flag; optimistically set before the server
    /// confirms it.
    pub authenticated: bool,
    pub user: Option<User>,
    pub initialized: bool,
}

/// Derived lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    /// Believed authenticated, user fetch not yet confirmed.
    Authenticating,
    Authenticated,
    /// An expired-credentials episode is being handled.
    Invalidating,
}

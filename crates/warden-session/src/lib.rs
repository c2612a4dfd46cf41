//! Wealth Warden Session Management
//!
//! Owns the authentication lifecycle:
//! - login/signup/password flows against the remote API
//! - the optimistic-then-correct `init` that confirms the persisted
//!   `authenticated` flag against the server on startup
//! - local logout with the durable-key-preserving preference wipe
//! - the session hook the transport invokes when expired credentials are
//!   confirmed

mod error;
mod manager;
mod models;
mod router;
mod session;

pub use error::SessionError;
pub use manager::{SessionManager, AUTHENTICATED_KEY, DURABLE_KEYS};
pub use models::{AuthForm, Permission, Role, User};
pub use router::{guard, GuardDecision, NoopRouter, RecordingRouter, RouteMeta, Router};
pub use session::{SessionPhase, SessionState};

pub type Result<T> = std::result::Result<T, SessionError>;

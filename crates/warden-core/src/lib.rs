//! Wealth Warden Client Core
//!
//! Wires configuration, the durable preference store, the HTTP transport
//! and the session manager into one embeddable client.

mod app;
mod config;
mod error;

pub use app::WealthWarden;
pub use config::Config;
pub use error::CoreError;

// Re-export the client surface
pub use warden_filter::{
    init_sort, merge_filters, resolve_for, sort_icon, toggle_sort, Column, ColumnType, Filter,
    FilterValue, MergePolicy, Operator, PanelContext, PanelKind, PanelModel, SortSpec,
};
pub use warden_http::{ApiClient, ApiRequest, ApiResponse, HttpError, Method};
pub use warden_session::{
    guard, AuthForm, GuardDecision, RouteMeta, Router, SessionError, SessionManager, SessionPhase,
    User,
};
pub use warden_storage::{PreferenceStore, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}

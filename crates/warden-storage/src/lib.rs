//! Wealth Warden Storage Layer
//!
//! Durable client-side key/value preferences. This is the piece of client
//! state that survives reloads and restarts: the persisted `authenticated`
//! flag, theme and accent choices, and whatever else the UI stashes.
//! `logout` wipes it wholesale except for an explicit durable key set.

mod error;
mod migrations;
mod store;

pub use error::StorageError;
pub use store::PreferenceStore;

pub type Result<T> = std::result::Result<T, StorageError>;

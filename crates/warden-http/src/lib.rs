//! Wealth Warden HTTP Transport
//!
//! Thin request/response layer over the remote API plus the
//! unauthorized-response recovery protocol:
//! - a request that comes back 401 is resent exactly once, trusting the
//!   server to have rotated the credential on the failing cycle
//! - if the resend still fails with 401 on a non-auth endpoint while the
//!   session believes it is authenticated, the session hook is invoked at
//!   most once per episode (single-flight latch)
//! - network failures and non-401 statuses pass through untouched

mod client;
mod error;
mod request;
pub mod testing;
mod transport;

pub use client::{ApiClient, SessionHook};
pub use error::HttpError;
pub use request::{ApiRequest, ApiResponse, Method};
pub use transport::{ReqwestTransport, Transport};

pub type Result<T> = std::result::Result<T, HttpError>;

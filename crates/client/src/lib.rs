//! # HMS Client
//!
//! Network side of the hospital management client:
//! - [`ApiClient`]: the shared HTTP transport and its status-code policy
//! - [`Session`]: persisted session state (token, user, preferences, expiring cache entries)
//! - [`services`]: typed wrappers for login, prescriptions, medications, notifications, reports,
//!   settings, files and dashboards
//! - [`poller`]: periodic refresh of the pharmacy queue
//!
//! Pure logic (permissions, validation, formatting, queue filtering) lives in `hms-core`.

mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod poller;
pub mod services;
pub mod session;

pub use client::{
    is_auth_endpoint, ApiClient, Query, RedirectHook, AUTH_ENDPOINTS, LOGIN_ROUTE,
    MAINTENANCE_ROUTE, SOCKET_ID_HEADER,
};
pub use config::{ApiVersion, ClientConfig};
pub use error::{ApiError, ClientError, ClientResult, ErrorKind, SideEffect};
pub use session::{FileStore, MemoryStore, Session, SessionStore};

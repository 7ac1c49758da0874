//! HTTP and realtime client for the Rozgar listing backend.

pub mod api;
pub mod realtime;
mod sse;

pub use api::{ApiClient, ApiError, AuditLogQuery, SubadminFilter, UserFilter};
pub use realtime::{ConnectionManager, ConnectionState};

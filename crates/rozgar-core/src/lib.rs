//! Session, authorization and configuration for the Rozgar staff console.

pub mod config;
pub mod gate;
pub mod session;


pub use config::{config_schema_json, load_config, ConsoleConfig, Settings};
pub use gate::{authorize, authorize_any_staff, Access, ANY_STAFF};
pub use session::{Permission, Principal, Role, Session, SessionError, SessionStore};

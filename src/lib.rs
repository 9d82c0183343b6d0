//! FreshKart - authentication and account security service
//!
//! Registration with email verification, login with progressive lockout,
//! password reset tokens, JWT sessions and role/permission based access
//! control, served as a JSON REST API.

pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod web;

pub use auth::{
    AuditEvent, AuditEventKind, AuditSink, AuthError, AuthService, LoginOutcome, RequestOrigin,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use db::{Account, AccountRepository, AccountStatus, Database, Permission, Role};
pub use error::{FreshkartError, Result};

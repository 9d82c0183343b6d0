//! Authentication and account security for FreshKart.
//!
//! This module provides password hashing, single-use and session tokens,
//! lockout policy, access control checks, audit events and the
//! [`AuthService`] that orchestrates them.

pub mod audit;
mod error;
pub mod lockout;
pub mod notify;
mod password;
pub mod permission;
mod service;
pub mod session;
pub mod token;
pub mod validation;

pub use audit::{
    AuditEvent, AuditEventKind, AuditSink, MemoryAuditSink, RequestOrigin, TracingAuditSink,
    AUDIT_TARGET,
};
pub use error::{AuthError, TokenPurpose};
pub use lockout::{LockoutPolicy, LOCKOUT_DURATION_SECS, MAX_LOGIN_ATTEMPTS};
pub use notify::{LogNotifier, MemoryNotifier, Notification, NotificationKind, Notifier, NotifyError};
pub use password::{secrets_equal, PasswordError, PasswordHashing};
pub use permission::{
    require_higher_role, require_ownership, require_permission, require_role, AccessError, Owned,
};
pub use service::{
    AuthService, IssuedToken, LoginOutcome, Registration, RegistrationRequest, Session,
};
pub use session::{SessionClaims, SessionTokens, TokenError};
pub use token::{hash_token, SingleUseToken};
pub use validation::ValidationError;

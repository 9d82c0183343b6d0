//! Security audit events.
//!
//! The auth service reports every security-relevant outcome to an injected
//! [`AuditSink`]. Production uses [`TracingAuditSink`], which emits warn-level
//! events on the `security` target; tests use [`MemoryAuditSink`].

use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Kind of security event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventKind {
    LoginSuccess,
    LoginFailure,
    AccountLocked,
    Registration,
    VerificationIssued,
    EmailVerified,
    PasswordResetRequest,
    PasswordResetSuccess,
    PasswordChange,
    Logout,
    RoleChange,
    PermissionChange,
    AccountActivation,
    AccessDenied,
    SuspiciousToken,
}

impl AuditEventKind {
    /// Stable event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventKind::LoginSuccess => "LOGIN_SUCCESS",
            AuditEventKind::LoginFailure => "LOGIN_FAILURE",
            AuditEventKind::AccountLocked => "ACCOUNT_LOCKED",
            AuditEventKind::Registration => "REGISTRATION",
            AuditEventKind::VerificationIssued => "VERIFICATION_ISSUED",
            AuditEventKind::EmailVerified => "EMAIL_VERIFIED",
            AuditEventKind::PasswordResetRequest => "PASSWORD_RESET_REQUEST",
            AuditEventKind::PasswordResetSuccess => "PASSWORD_RESET_SUCCESS",
            AuditEventKind::PasswordChange => "PASSWORD_CHANGE",
            AuditEventKind::Logout => "LOGOUT",
            AuditEventKind::RoleChange => "ROLE_CHANGE",
            AuditEventKind::PermissionChange => "PERMISSION_CHANGE",
            AuditEventKind::AccountActivation => "ACCOUNT_ACTIVATION",
            AuditEventKind::AccessDenied => "ACCESS_DENIED",
            AuditEventKind::SuspiciousToken => "SUSPICIOUS_TOKEN",
        }
    }
}

impl fmt::Display for AuditEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a request came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestOrigin {
    /// Client IP address.
    pub ip: Option<String>,
    /// User-Agent header.
    pub user_agent: Option<String>,
}

impl RequestOrigin {
    /// Create an origin from optional IP and user agent.
    pub fn new(ip: Option<String>, user_agent: Option<String>) -> Self {
        Self { ip, user_agent }
    }
}

/// A single audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEvent {
    pub kind: AuditEventKind,
    pub at: DateTime<Utc>,
    pub account_id: Option<i64>,
    pub email: Option<String>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    /// Short machine-friendly reason (failure cause, denied check).
    pub reason: Option<String>,
    /// Free-form detail such as `buyer -> seller`.
    pub detail: Option<String>,
}

impl AuditEvent {
    /// Create an event of `kind` at `at`.
    pub fn new(kind: AuditEventKind, at: DateTime<Utc>) -> Self {
        Self {
            kind,
            at,
            account_id: None,
            email: None,
            ip: None,
            user_agent: None,
            reason: None,
            detail: None,
        }
    }

    pub fn account(mut self, id: i64) -> Self {
        self.account_id = Some(id);
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn origin(mut self, origin: &RequestOrigin) -> Self {
        self.ip = origin.ip.clone();
        self.user_agent = origin.user_agent.clone();
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Destination for audit events.
pub trait AuditSink: Send + Sync {
    /// Record an event. Must not fail the calling operation.
    fn record(&self, event: AuditEvent);
}

/// `tracing` target carrying audit events.
pub const AUDIT_TARGET: &str = "security";

/// Emits audit events as structured `tracing` events on [`AUDIT_TARGET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        tracing::warn!(
            target: AUDIT_TARGET,
            event = event.kind.as_str(),
            at = %event.at.to_rfc3339(),
            account_id = event.account_id,
            email = event.email.as_deref(),
            ip = event.ip.as_deref(),
            user_agent = event.user_agent.as_deref(),
            reason = event.reason.as_deref(),
            detail = event.detail.as_deref(),
            "SECURITY_EVENT"
        );
    }
}

/// Keeps audit events in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Kinds of recorded events in order.
    pub fn kinds(&self) -> Vec<AuditEventKind> {
        self.events().into_iter().map(|e| e.kind).collect()
    }

    /// Number of events of `kind`.
    pub fn count(&self, kind: AuditEventKind) -> usize {
        self.events().iter().filter(|e| e.kind == kind).count()
    }

    /// Most recent event of `kind`.
    pub fn last(&self, kind: AuditEventKind) -> Option<AuditEvent> {
        self.events().into_iter().rev().find(|e| e.kind == kind)
    }

    /// Drop recorded events.
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

//! Outbound account notifications (verification and reset links).

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

/// Notification delivery errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// What a notification is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    EmailVerification,
    PasswordReset,
}

/// A message addressed to an account holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    /// Recipient email address.
    pub to: String,
    /// Recipient display name.
    pub name: String,
    /// Link the recipient follows.
    pub link: String,
    /// Plaintext single-use token embedded in `link`.
    pub token: String,
}

impl Notification {
    /// Subject line for the message.
    pub fn subject(&self) -> &'static str {
        match self.kind {
            NotificationKind::EmailVerification => "Verify your FreshKart email",
            NotificationKind::PasswordReset => "Reset your FreshKart password",
        }
    }
}

/// Delivers notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Writes the link to the log instead of sending mail.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        tracing::info!(
            to = %notification.to,
            subject = notification.subject(),
            link = %notification.link,
            "Notification queued"
        );
        Ok(())
    }
}

/// Collects notifications in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: Mutex<bool>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        *self.fail.lock().unwrap_or_else(|e| e.into_inner()) = failing;
    }

    /// Snapshot of delivered notifications.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Most recent notification of `kind` sent to `to`.
    pub fn last_to(&self, to: &str, kind: NotificationKind) -> Option<Notification> {
        self.sent()
            .into_iter()
            .rev()
            .find(|n| n.to == to && n.kind == kind)
    }

    /// Plaintext token from the most recent notification of `kind` to `to`.
    pub fn last_token(&self, to: &str, kind: NotificationKind) -> Option<String> {
        self.last_to(to, kind).map(|n| n.token)
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        if *self.fail.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(NotifyError("mailer unavailable".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: NotificationKind, token: &str) -> Notification {
        Notification {
            kind,
            to: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            link: format!("http://localhost:3000/verify-email/{token}"),
            token: token.to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_notifier_records() {
        let notifier = MemoryNotifier::new();
        notifier
            .send(sample(NotificationKind::EmailVerification, "aaa"))
            .await
            .unwrap();
        notifier
            .send(sample(NotificationKind::EmailVerification, "bbb"))
            .await
            .unwrap();

        assert_eq!(notifier.sent().len(), 2);
        assert_eq!(
            notifier
                .last_token("alice@example.com", NotificationKind::EmailVerification)
                .as_deref(),
            Some("bbb")
        );
        assert!(notifier
            .last_token("alice@example.com", NotificationKind::PasswordReset)
            .is_none());
    }

    #[tokio::test]
    async fn test_memory_notifier_failure() {
        let notifier = MemoryNotifier::new();
        notifier.set_failing(true);
        let result = notifier
            .send(sample(NotificationKind::PasswordReset, "ccc"))
            .await;
        assert!(result.is_err());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_log_notifier() {
        let result = LogNotifier
            .send(sample(NotificationKind::EmailVerification, "ddd"))
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_subject() {
        assert!(sample(NotificationKind::PasswordReset, "x")
            .subject()
            .contains("Reset"));
    }
}

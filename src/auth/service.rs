//! Account security orchestration.
//!
//! [`AuthService`] ties the account store, token minting, lockout policy,
//! audit sink and notifier together. Every time comparison uses the
//! injected [`Clock`], so expiry and lock behaviour can be driven from tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info};

use super::audit::{AuditEvent, AuditEventKind, AuditSink, RequestOrigin, TracingAuditSink};
use super::error::{AuthError, TokenPurpose};
use super::lockout::{remaining_minutes, LockoutPolicy};
use super::notify::{LogNotifier, Notification, NotificationKind, Notifier};
use super::password::PasswordHashing;
use super::permission::{require_higher_role, require_ownership, require_permission, require_role};
use super::session::{changed_password_after, SessionTokens};
use super::token::{hash_token, SingleUseToken};
use super::validation::{
    validate_email, validate_name, validate_password, validate_password_change,
    validate_registration, validate_requested_role, ValidationError,
};
use crate::clock::{Clock, SystemClock};
use crate::config::AuthConfig;
use crate::db::{
    normalize_email, Account, AccountRepository, Database, NewAccount, Permission, Role,
};

type AuthResult<T> = std::result::Result<T, AuthError>;

/// Registration input.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Requested role; only `buyer` and `seller` are honoured.
    pub role: Option<String>,
}

impl RegistrationRequest {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// A single-use token as handed to the account holder.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Plaintext token.
    pub token: String,
    /// Link embedding the token.
    pub link: String,
    pub expires_at: DateTime<Utc>,
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub account: Account,
    pub verification: IssuedToken,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub account: Account,
    pub token: String,
    /// Set when the account has not verified its email yet.
    pub email_verified_warning: bool,
}

/// An account together with a freshly issued session token.
#[derive(Debug, Clone)]
pub struct Session {
    pub account: Account,
    pub token: String,
}

/// Account security service.
pub struct AuthService {
    db: Database,
    clock: Arc<dyn Clock>,
    audit: Arc<dyn AuditSink>,
    notifier: Arc<dyn Notifier>,
    passwords: PasswordHashing,
    sessions: SessionTokens,
    lockout: LockoutPolicy,
    verification_ttl: Duration,
    reset_ttl: Duration,
    frontend_url: String,
    /// Hash verified against when the email is unknown, so that path costs
    /// the same as a wrong password.
    dummy_hash: String,
}

impl AuthService {
    /// Create a service using the system clock, tracing audit sink and
    /// logging notifier.
    pub fn new(db: Database, config: &AuthConfig) -> AuthResult<Self> {
        let passwords = PasswordHashing::new(&config.argon2)?;
        let dummy_hash = passwords.hash("freshkart-unknown-account")?;
        Ok(Self {
            db,
            clock: Arc::new(SystemClock),
            audit: Arc::new(TracingAuditSink),
            notifier: Arc::new(LogNotifier),
            passwords,
            sessions: SessionTokens::new(&config.jwt_secret, config.session_expiry()?),
            lockout: LockoutPolicy::from_config(config)?,
            verification_ttl: config.verification_token_ttl()?,
            reset_ttl: config.reset_token_ttl()?,
            frontend_url: config.frontend_url.trim_end_matches('/').to_string(),
            dummy_hash,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn lockout_policy(&self) -> LockoutPolicy {
        self.lockout
    }

    fn repo(&self) -> AccountRepository<'_> {
        AccountRepository::new(self.db.pool())
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn event(&self, kind: AuditEventKind, origin: &RequestOrigin) -> AuditEvent {
        AuditEvent::new(kind, self.now()).origin(origin)
    }

    fn issue_session(&self, account: Account) -> AuthResult<Session> {
        let token = self.sessions.issue(account.id, self.now())?;
        Ok(Session { account, token })
    }

    /// Create an account and send its verification link.
    pub async fn register(
        &self,
        request: RegistrationRequest,
        origin: &RequestOrigin,
    ) -> AuthResult<Registration> {
        validate_registration(&request.name, &request.email, &request.password)?;
        validate_requested_role(request.role.as_deref())?;

        let email = normalize_email(&request.email);
        if self.repo().email_exists(&email).await? {
            self.audit.record(
                self.event(AuditEventKind::Registration, origin)
                    .email(&email)
                    .reason("duplicate_email"),
            );
            return Err(AuthError::DuplicateIdentity);
        }

        let password_hash = self.passwords.hash_blocking(&request.password).await?;
        let role = Role::for_registration(request.role.as_deref());
        let new = NewAccount::new(request.name.trim(), &email, password_hash).with_role(role);
        let account = self.repo().create(&new, self.now()).await?;

        let verification = self.issue_verification(&account).await?;
        info!(account_id = account.id, role = %account.role, "Account registered");
        self.audit.record(
            self.event(AuditEventKind::Registration, origin)
                .account(account.id)
                .email(&account.email)
                .detail(account.role.as_str()),
        );

        Ok(Registration {
            account,
            verification,
        })
    }

    /// Store a fresh verification token and hand the link to the notifier.
    ///
    /// A delivery failure is logged; the token stays valid so the account
    /// holder can ask for it again.
    async fn issue_verification(&self, account: &Account) -> AuthResult<IssuedToken> {
        let token = SingleUseToken::generate();
        let expires_at = self.now() + self.verification_ttl;
        self.repo()
            .store_email_verification_token(account.id, &token.hash, expires_at)
            .await?;

        let link = format!("{}/verify-email/{}", self.frontend_url, token.plaintext);
        let notification = Notification {
            kind: NotificationKind::EmailVerification,
            to: account.email.clone(),
            name: account.name.clone(),
            link: link.clone(),
            token: token.plaintext.clone(),
        };
        if let Err(e) = self.notifier.send(notification).await {
            error!(account_id = account.id, error = %e, "Failed to send verification email");
        }

        Ok(IssuedToken {
            token: token.plaintext,
            link,
            expires_at,
        })
    }

    /// Authenticate with email and password.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        origin: &RequestOrigin,
    ) -> AuthResult<LoginOutcome> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(ValidationError::PasswordRequired.into());
        }

        let email = normalize_email(email);
        let now = self.now();

        let Some(account) = self.repo().get_by_email(&email).await? else {
            // Burn the same hashing cost as a real mismatch.
            let _ = self
                .passwords
                .verify_blocking(password, &self.dummy_hash)
                .await;
            self.audit.record(
                self.event(AuditEventKind::LoginFailure, origin)
                    .email(&email)
                    .reason("user_not_found"),
            );
            return Err(AuthError::InvalidCredentials);
        };

        if let Some(lock_until) = account.lock_until.filter(|until| *until > now) {
            self.audit.record(
                self.event(AuditEventKind::LoginFailure, origin)
                    .account(account.id)
                    .email(&email)
                    .reason("account_locked"),
            );
            return Err(AuthError::Locked {
                remaining_minutes: remaining_minutes(lock_until, now),
            });
        }

        if !account.is_active {
            self.audit.record(
                self.event(AuditEventKind::LoginFailure, origin)
                    .account(account.id)
                    .email(&email)
                    .reason("account_inactive"),
            );
            return Err(AuthError::AccountInactive);
        }

        let matches = self
            .passwords
            .verify_blocking(password, &account.password_hash)
            .await?;
        if !matches {
            let state = self
                .repo()
                .record_failed_login(
                    account.id,
                    now,
                    self.lockout.max_attempts,
                    self.lockout.lock_duration,
                )
                .await?;

            if state.is_some_and(|s| s.is_locked(now)) {
                self.audit.record(
                    self.event(AuditEventKind::AccountLocked, origin)
                        .account(account.id)
                        .email(&email)
                        .reason("too_many_failed_attempts"),
                );
                return Err(AuthError::LockedOut {
                    lock_minutes: self.lockout.lock_minutes(),
                });
            }

            let attempts = state.map(|s| s.login_attempts).unwrap_or_default();
            self.audit.record(
                self.event(AuditEventKind::LoginFailure, origin)
                    .account(account.id)
                    .email(&email)
                    .reason("invalid_password")
                    .detail(format!("attempt {attempts}")),
            );
            return Err(AuthError::InvalidCredentials);
        }

        let account = self
            .repo()
            .record_successful_login(account.id, now, origin.ip.as_deref())
            .await?
            .ok_or_else(|| AuthError::NotFound("User".to_string()))?;

        self.audit.record(
            self.event(AuditEventKind::LoginSuccess, origin)
                .account(account.id)
                .email(&account.email),
        );

        let email_verified_warning = !account.email_verified;
        let session = self.issue_session(account)?;
        Ok(LoginOutcome {
            account: session.account,
            token: session.token,
            email_verified_warning,
        })
    }

    /// Record a logout. Session tokens are discarded client side.
    pub fn logout(&self, account: &Account, origin: &RequestOrigin) {
        self.audit.record(
            self.event(AuditEventKind::Logout, origin)
                .account(account.id)
                .email(&account.email),
        );
    }

    /// Consume a verification token and start a session.
    pub async fn verify_email(&self, token: &str, origin: &RequestOrigin) -> AuthResult<Session> {
        let consumed = self
            .repo()
            .consume_email_verification_token(&hash_token(token), self.now())
            .await?;

        let Some(account) = consumed else {
            self.audit.record(
                self.event(AuditEventKind::SuspiciousToken, origin)
                    .reason("invalid_verification_token"),
            );
            return Err(AuthError::InvalidOrExpiredToken(TokenPurpose::Verification));
        };

        self.audit.record(
            self.event(AuditEventKind::EmailVerified, origin)
                .account(account.id)
                .email(&account.email),
        );
        self.issue_session(account)
    }

    /// Issue a new verification token, replacing the outstanding one.
    pub async fn resend_verification(
        &self,
        email: &str,
        origin: &RequestOrigin,
    ) -> AuthResult<IssuedToken> {
        validate_email(email)?;
        let email = normalize_email(email);

        let account = self
            .repo()
            .get_by_email(&email)
            .await?
            .ok_or_else(|| AuthError::NotFound("User".to_string()))?;
        if account.email_verified {
            return Err(AuthError::AlreadyVerified);
        }

        let issued = self.issue_verification(&account).await?;
        self.audit.record(
            self.event(AuditEventKind::VerificationIssued, origin)
                .account(account.id)
                .email(&account.email),
        );
        Ok(issued)
    }

    /// Start a password reset.
    ///
    /// The result is the same whether or not the email belongs to an
    /// account; only the side effects differ.
    pub async fn forgot_password(&self, email: &str, origin: &RequestOrigin) -> AuthResult<()> {
        validate_email(email)?;
        let email = normalize_email(email);

        let Some(account) = self.repo().get_by_email(&email).await? else {
            self.audit.record(
                self.event(AuditEventKind::PasswordResetRequest, origin)
                    .email(&email)
                    .reason("unknown_email"),
            );
            return Ok(());
        };

        let token = SingleUseToken::generate();
        let expires_at = self.now() + self.reset_ttl;
        self.repo()
            .store_password_reset_token(account.id, &token.hash, expires_at)
            .await?;

        let notification = Notification {
            kind: NotificationKind::PasswordReset,
            to: account.email.clone(),
            name: account.name.clone(),
            link: format!("{}/reset-password/{}", self.frontend_url, token.plaintext),
            token: token.plaintext,
        };
        if let Err(e) = self.notifier.send(notification).await {
            error!(account_id = account.id, error = %e, "Failed to send password reset email");
            self.repo().clear_password_reset_token(account.id).await?;
            self.audit.record(
                self.event(AuditEventKind::PasswordResetRequest, origin)
                    .account(account.id)
                    .email(&account.email)
                    .reason("delivery_failed"),
            );
            return Ok(());
        }

        self.audit.record(
            self.event(AuditEventKind::PasswordResetRequest, origin)
                .account(account.id)
                .email(&account.email),
        );
        Ok(())
    }

    /// Consume a reset token, install the new password and start a session.
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
        origin: &RequestOrigin,
    ) -> AuthResult<Session> {
        validate_password(new_password)?;

        let new_hash = self.passwords.hash_blocking(new_password).await?;
        let now = self.now();
        let consumed = self
            .repo()
            .consume_password_reset_token(
                &hash_token(token),
                &new_hash,
                now,
                now,
            )
            .await?;

        let Some(account) = consumed else {
            self.audit.record(
                self.event(AuditEventKind::SuspiciousToken, origin)
                    .reason("invalid_reset_token"),
            );
            return Err(AuthError::InvalidOrExpiredToken(TokenPurpose::Reset));
        };

        self.audit.record(
            self.event(AuditEventKind::PasswordResetSuccess, origin)
                .account(account.id)
                .email(&account.email),
        );
        self.issue_session(account)
    }

    /// Change the password of an authenticated account.
    pub async fn change_password(
        &self,
        account: &Account,
        current_password: &str,
        new_password: &str,
        origin: &RequestOrigin,
    ) -> AuthResult<Session> {
        if current_password.is_empty() {
            return Err(ValidationError::PasswordRequired.into());
        }
        validate_password_change(current_password, new_password)?;

        let matches = self
            .passwords
            .verify_blocking(current_password, &account.password_hash)
            .await?;
        if !matches {
            self.audit.record(
                self.event(AuditEventKind::AccessDenied, origin)
                    .account(account.id)
                    .email(&account.email)
                    .reason("incorrect_current_password"),
            );
            return Err(AuthError::IncorrectPassword);
        }

        let new_hash = self.passwords.hash_blocking(new_password).await?;
        let now = self.now();
        let updated = self
            .repo()
            .update_password(account.id, &new_hash, now, now)
            .await?
            .ok_or_else(|| AuthError::NotFound("User".to_string()))?;

        self.audit.record(
            self.event(AuditEventKind::PasswordChange, origin)
                .account(updated.id)
                .email(&updated.email),
        );
        self.issue_session(updated)
    }

    /// Resolve a session token to its account.
    ///
    /// Rejects unknown accounts, deactivated or locked accounts, and
    /// sessions issued before the last password change.
    pub async fn authenticate(&self, token: &str) -> AuthResult<Account> {
        let now = self.now();
        let claims = self.sessions.verify(token, now).map_err(|e| {
            debug!(error = %e, "Session token rejected");
            AuthError::from(e)
        })?;

        let account = self
            .repo()
            .get_by_id(claims.sub)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !account.is_active {
            return Err(AuthError::AccountInactive);
        }
        if let Some(lock_until) = account.lock_until.filter(|until| *until > now) {
            return Err(AuthError::Locked {
                remaining_minutes: remaining_minutes(lock_until, now),
            });
        }
        if changed_password_after(account.password_changed_at, claims.iat_ms) {
            self.audit.record(
                AuditEvent::new(AuditEventKind::SuspiciousToken, now)
                    .account(account.id)
                    .reason("stale_session"),
            );
            return Err(AuthError::StaleSession);
        }

        Ok(account)
    }

    /// Look up an account the caller owns (administrators see any).
    pub async fn get_account(&self, caller: &Account, id: i64) -> AuthResult<Account> {
        // Non-admins learn nothing about ids they do not own.
        if !caller.is_admin && caller.id != id {
            return Err(AuthError::Forbidden(
                "You do not own this resource".to_string(),
            ));
        }
        let target = self.repo().get_by_id(id).await?;
        require_ownership(Some(caller), target.as_ref())?;
        target.ok_or_else(|| AuthError::NotFound("User".to_string()))
    }

    fn denied(&self, caller: &Account, origin: &RequestOrigin, reason: &str) {
        self.audit.record(
            self.event(AuditEventKind::AccessDenied, origin)
                .account(caller.id)
                .email(&caller.email)
                .reason(reason),
        );
    }

    /// Change another account's role and permissions.
    ///
    /// The caller needs `manage_users` and must outrank both the target's
    /// current role and the role being granted. `permissions` defaults to
    /// the new role's standard set.
    pub async fn change_role(
        &self,
        caller: &Account,
        target_id: i64,
        role: Role,
        permissions: Option<Vec<Permission>>,
        origin: &RequestOrigin,
    ) -> AuthResult<Account> {
        if let Err(e) = require_permission(Some(caller), Permission::ManageUsers) {
            self.denied(caller, origin, "change_role: missing manage_users");
            return Err(e.into());
        }

        let target = self
            .repo()
            .get_by_id(target_id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User".to_string()))?;

        let ranked = require_higher_role(Some(caller), target.role)
            .and_then(|_| require_higher_role(Some(caller), role));
        if let Err(e) = ranked {
            self.denied(caller, origin, "change_role: insufficient rank");
            return Err(e.into());
        }

        let mut permissions = match permissions {
            Some(list) if role != Role::Admin => list,
            _ => role.default_permissions(),
        };
        permissions.sort_by_key(|p| p.as_str());
        permissions.dedup();

        let previous_role = target.role;
        let mut previous_permissions = target.permissions.clone();
        previous_permissions.sort_by_key(|p| p.as_str());

        let updated = self
            .repo()
            .update_role(target.id, role, &permissions, self.now())
            .await?
            .ok_or_else(|| AuthError::NotFound("User".to_string()))?;

        if previous_role != role {
            self.audit.record(
                self.event(AuditEventKind::RoleChange, origin)
                    .account(updated.id)
                    .email(&updated.email)
                    .reason(format!("by account {}", caller.id))
                    .detail(format!("{previous_role} -> {role}")),
            );
        }
        if previous_permissions != permissions {
            let names: Vec<&str> = permissions.iter().map(Permission::as_str).collect();
            self.audit.record(
                self.event(AuditEventKind::PermissionChange, origin)
                    .account(updated.id)
                    .email(&updated.email)
                    .reason(format!("by account {}", caller.id))
                    .detail(names.join(",")),
            );
        }
        info!(
            account_id = updated.id,
            role = %updated.role,
            changed_by = caller.id,
            "Account role updated"
        );
        Ok(updated)
    }

    /// Activate or deactivate an account. Administrators only.
    pub async fn set_active(
        &self,
        caller: &Account,
        target_id: i64,
        active: bool,
        origin: &RequestOrigin,
    ) -> AuthResult<Account> {
        if let Err(e) = require_role(Some(caller), &[Role::Admin]) {
            self.denied(caller, origin, "set_active: admin required");
            return Err(e.into());
        }

        let updated = self
            .repo()
            .set_active(target_id, active, self.now())
            .await?
            .ok_or_else(|| AuthError::NotFound("User".to_string()))?;

        self.audit.record(
            self.event(AuditEventKind::AccountActivation, origin)
                .account(updated.id)
                .email(&updated.email)
                .reason(format!("by account {}", caller.id))
                .detail(if active { "activated" } else { "deactivated" }),
        );
        Ok(updated)
    }

    /// Create a verified administrator, or promote an existing account.
    ///
    /// An existing account keeps its password.
    pub async fn bootstrap_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> AuthResult<Account> {
        validate_name(name)?;
        validate_email(email)?;
        let email = normalize_email(email);
        let origin = RequestOrigin::default();

        if let Some(existing) = self.repo().get_by_email(&email).await? {
            let promoted = self
                .repo()
                .promote_to_admin(existing.id, self.now())
                .await?
                .ok_or_else(|| AuthError::NotFound("User".to_string()))?;
            self.audit.record(
                self.event(AuditEventKind::RoleChange, &origin)
                    .account(promoted.id)
                    .email(&promoted.email)
                    .reason("bootstrap")
                    .detail(format!("{} -> admin", existing.role)),
            );
            return Ok(promoted);
        }

        validate_password(password)?;
        let password_hash = self.passwords.hash_blocking(password).await?;
        let new = NewAccount::new(name.trim(), &email, password_hash)
            .with_role(Role::Admin)
            .verified();
        let account = self.repo().create(&new, self.now()).await?;
        self.audit.record(
            self.event(AuditEventKind::Registration, &origin)
                .account(account.id)
                .email(&account.email)
                .reason("bootstrap")
                .detail(Role::Admin.as_str()),
        );
        Ok(account)
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("lockout", &self.lockout)
            .field("frontend_url", &self.frontend_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::audit::MemoryAuditSink;
    use crate::auth::notify::MemoryNotifier;
    use crate::clock::ManualClock;
    use crate::config::Argon2Config;

    struct Fixture {
        service: AuthService,
        clock: Arc<ManualClock>,
        audit: Arc<MemoryAuditSink>,
        notifier: Arc<MemoryNotifier>,
    }

    async fn fixture() -> Fixture {
        let db = Database::open_in_memory().await.unwrap();
        let config = AuthConfig {
            jwt_secret: "test-secret-test-secret-test-secret".to_string(),
            argon2: Argon2Config {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
            ..Default::default()
        };
        let clock = Arc::new(ManualClock::starting_now());
        let audit = Arc::new(MemoryAuditSink::new());
        let notifier = Arc::new(MemoryNotifier::new());
        let service = AuthService::new(db, &config)
            .unwrap()
            .with_clock(clock.clone())
            .with_audit_sink(audit.clone())
            .with_notifier(notifier.clone());
        Fixture {
            service,
            clock,
            audit,
            notifier,
        }
    }

    fn origin() -> RequestOrigin {
        RequestOrigin::new(Some("127.0.0.1".into()), Some("test".into()))
    }

    #[tokio::test]
    async fn test_register_normalizes_email_and_sends_link() {
        let f = fixture().await;
        let reg = f
            .service
            .register(
                RegistrationRequest::new("Alice", "  Alice@Example.COM ", "Str0ng!Pass"),
                &origin(),
            )
            .await
            .unwrap();

        assert_eq!(reg.account.email, "alice@example.com");
        assert_eq!(reg.account.role, Role::Buyer);
        assert!(!reg.account.email_verified);
        assert!(reg
            .verification
            .link
            .ends_with(&format!("/verify-email/{}", reg.verification.token)));
        assert_eq!(
            f.notifier
                .last_token("alice@example.com", NotificationKind::EmailVerification)
                .as_deref(),
            Some(reg.verification.token.as_str())
        );
        assert_eq!(f.audit.count(AuditEventKind::Registration), 1);
    }

    #[tokio::test]
    async fn test_register_rejects_privileged_role() {
        let f = fixture().await;
        let err = f
            .service
            .register(
                RegistrationRequest::new("Mallory", "m@example.com", "Str0ng!Pass")
                    .with_role("admin"),
                &origin(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Validation(ValidationError::InvalidRole)
        ));
    }

    #[tokio::test]
    async fn test_register_survives_notifier_failure() {
        let f = fixture().await;
        f.notifier.set_failing(true);
        let reg = f
            .service
            .register(
                RegistrationRequest::new("Alice", "alice@example.com", "Str0ng!Pass"),
                &origin(),
            )
            .await
            .unwrap();

        // The token is still stored and usable.
        let session = f
            .service
            .verify_email(&reg.verification.token, &origin())
            .await
            .unwrap();
        assert!(session.account.email_verified);
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_generic() {
        let f = fixture().await;
        let err = f
            .service
            .login("nobody@example.com", "Str0ng!Pass", &origin())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        let event = f.audit.last(AuditEventKind::LoginFailure).unwrap();
        assert_eq!(event.reason.as_deref(), Some("user_not_found"));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_garbage() {
        let f = fixture().await;
        assert!(matches!(
            f.service.authenticate("not-a-jwt").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_session_expires_with_clock() {
        let f = fixture().await;
        let reg = f
            .service
            .register(
                RegistrationRequest::new("Alice", "alice@example.com", "Str0ng!Pass"),
                &origin(),
            )
            .await
            .unwrap();
        let session = f
            .service
            .verify_email(&reg.verification.token, &origin())
            .await
            .unwrap();

        f.clock.advance(Duration::days(31));
        assert!(matches!(
            f.service.authenticate(&session.token).await,
            Err(AuthError::ExpiredToken)
        ));
    }
}

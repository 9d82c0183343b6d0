//! Shared fixtures for integration tests.
//!
//! Builds an [`AuthService`] over an in-memory database with a manual clock,
//! in-memory audit sink and notifier, and cheap password hashing.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;

use freshkart::auth::{MemoryAuditSink, MemoryNotifier, NotificationKind, RegistrationRequest};
use freshkart::config::{Argon2Config, AuthConfig, QuotaConfig, RateLimitConfig};
use freshkart::web::middleware::{DisabledCaptcha, RateLimitState};
use freshkart::web::{create_health_router, create_router, AppState};
use freshkart::{Account, AuthService, Database, ManualClock, RequestOrigin, Role};

/// A password that satisfies the strength rules.
pub const PASSWORD: &str = "Str0ng!Pass";

/// A different strong password.
pub const NEW_PASSWORD: &str = "N3w!Secret";

/// Test harness around an [`AuthService`].
pub struct Harness {
    pub service: Arc<AuthService>,
    pub clock: Arc<ManualClock>,
    pub audit: Arc<MemoryAuditSink>,
    pub notifier: Arc<MemoryNotifier>,
}

/// Auth configuration with a fixed secret and minimal argon2 cost.
pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "integration-secret-integration-secret".to_string(),
        argon2: Argon2Config {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        ..Default::default()
    }
}

/// Create a harness over a fresh in-memory database.
pub async fn harness() -> Harness {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let clock = Arc::new(ManualClock::starting_now());
    let audit = Arc::new(MemoryAuditSink::new());
    let notifier = Arc::new(MemoryNotifier::new());
    let service = AuthService::new(db, &test_auth_config())
        .expect("Failed to create auth service")
        .with_clock(clock.clone())
        .with_audit_sink(audit.clone())
        .with_notifier(notifier.clone());

    Harness {
        service: Arc::new(service),
        clock,
        audit,
        notifier,
    }
}

/// Origin used for service-level calls.
pub fn origin() -> RequestOrigin {
    RequestOrigin::new(Some("203.0.113.7".to_string()), Some("tests".to_string()))
}

impl Harness {
    /// Register a buyer account.
    pub async fn register(&self, name: &str, email: &str) -> Account {
        self.service
            .register(RegistrationRequest::new(name, email, PASSWORD), &origin())
            .await
            .expect("registration failed")
            .account
    }

    /// Register an account and confirm its email.
    pub async fn register_verified(&self, name: &str, email: &str) -> Account {
        self.register(name, email).await;
        let token = self
            .notifier
            .last_token(email, NotificationKind::EmailVerification)
            .expect("no verification email");
        self.service
            .verify_email(&token, &origin())
            .await
            .expect("verification failed")
            .account
    }

    /// Create a verified administrator.
    pub async fn admin(&self) -> Account {
        self.service
            .bootstrap_admin("Root", "root@freshkart.test", PASSWORD)
            .await
            .expect("bootstrap failed")
    }

    /// Register a verified account and give it `role` through an admin.
    pub async fn account_with_role(&self, name: &str, email: &str, role: Role) -> Account {
        let admin = self.admin().await;
        let account = self.register_verified(name, email).await;
        self.service
            .change_role(&admin, account.id, role, None, &origin())
            .await
            .expect("role change failed")
    }

    /// Log in and return the session token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        self.service
            .login(email, password, &origin())
            .await
            .expect("login failed")
            .token
    }
}

/// Rate limits generous enough that tests never trip them.
pub fn relaxed_rate_limits() -> RateLimitConfig {
    let wide = QuotaConfig::new(1000, 60);
    RateLimitConfig {
        login: wide,
        register: wide,
        password_reset: wide,
        resend_verification: wide,
        api: wide,
    }
}

/// HTTP test server over the harness service.
pub fn test_server(harness: &Harness, rate_limits: RateLimitConfig) -> TestServer {
    let state = Arc::new(AppState::new(
        harness.service.clone(),
        Arc::new(DisabledCaptcha),
    ));
    let router = create_router(
        state,
        Arc::new(RateLimitState::new(rate_limits)),
        &["http://localhost:3000".to_string()],
    )
    .merge(create_health_router());
    TestServer::new(router).expect("Failed to create test server")
}

//! Rate limiting middleware.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter,
};
use std::{num::NonZeroU32, sync::Arc, time::Duration};

use super::client_ip::TrustedProxies;
use crate::config::{QuotaConfig, RateLimitConfig};
use crate::web::error::ApiError;

/// Rate limiter keyed by client IP.
pub type IpRateLimiter = DefaultKeyedRateLimiter<String>;

/// Rate-limited action. Each action has its own quota and bucket per IP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitAction {
    Login,
    Register,
    PasswordReset,
    ResendVerification,
    Api,
}

impl RateLimitAction {
    pub const ALL: [RateLimitAction; 5] = [
        RateLimitAction::Login,
        RateLimitAction::Register,
        RateLimitAction::PasswordReset,
        RateLimitAction::ResendVerification,
        RateLimitAction::Api,
    ];

    /// Message returned when the quota is exhausted.
    pub fn message(&self) -> &'static str {
        match self {
            RateLimitAction::Login => {
                "Too many login attempts from this IP, please try again after 15 minutes"
            }
            RateLimitAction::Register => {
                "Too many accounts created from this IP, please try again after an hour"
            }
            RateLimitAction::PasswordReset => {
                "Too many password reset attempts, please try again after an hour"
            }
            RateLimitAction::ResendVerification => {
                "Too many verification email requests, please try again later"
            }
            RateLimitAction::Api => "Too many requests from this IP, please try again later",
        }
    }
}

/// State for rate limiting: one keyed limiter per action.
pub struct RateLimitState {
    login: IpRateLimiter,
    register: IpRateLimiter,
    password_reset: IpRateLimiter,
    resend_verification: IpRateLimiter,
    api: IpRateLimiter,
    proxies: TrustedProxies,
}

impl RateLimitState {
    /// Create a new rate limit state.
    pub fn new(config: RateLimitConfig) -> Self {
        let keyed = |quota: QuotaConfig| RateLimiter::keyed(Self::quota(quota));
        Self {
            login: keyed(config.login),
            register: keyed(config.register),
            password_reset: keyed(config.password_reset),
            resend_verification: keyed(config.resend_verification),
            api: keyed(config.api),
            proxies: TrustedProxies::default(),
        }
    }

    /// Believe forwarding headers from these proxies.
    pub fn with_trusted_proxies(mut self, proxies: TrustedProxies) -> Self {
        self.proxies = proxies;
        self
    }

    pub fn trusted_proxies(&self) -> &TrustedProxies {
        &self.proxies
    }

    /// `max_requests` per `window_secs`, allowed as a burst and replenished
    /// evenly across the window.
    fn quota(config: QuotaConfig) -> Quota {
        let max = NonZeroU32::new(config.max_requests).unwrap_or(NonZeroU32::MIN);
        let window = Duration::from_secs(config.window_secs.max(1));
        let period = window / max.get();
        Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(max))
            .allow_burst(max)
    }

    fn limiter(&self, action: RateLimitAction) -> &IpRateLimiter {
        match action {
            RateLimitAction::Login => &self.login,
            RateLimitAction::Register => &self.register,
            RateLimitAction::PasswordReset => &self.password_reset,
            RateLimitAction::ResendVerification => &self.resend_verification,
            RateLimitAction::Api => &self.api,
        }
    }

    /// Check if a request from `ip` is allowed for `action`.
    pub fn check(&self, action: RateLimitAction, ip: &str) -> bool {
        self.admit(action, ip).is_ok()
    }

    /// Admit a request, or return how long until the next one would be.
    pub fn admit(&self, action: RateLimitAction, ip: &str) -> Result<(), Duration> {
        self.limiter(action)
            .check_key(&ip.to_string())
            .map_err(|not_until| not_until.wait_time_from(DefaultClock::default().now()))
    }

    /// Forget clients whose buckets have fully refilled.
    pub fn cleanup(&self) {
        for action in RateLimitAction::ALL {
            let limiter = self.limiter(action);
            limiter.retain_recent();
            limiter.shrink_to_fit();
        }
    }

    /// Start a background task to periodically clean up old entries.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(300)).await;
                self.cleanup();
            }
        });
    }
}

/// Middleware state binding the shared limiters to one action.
#[derive(Clone)]
pub struct ActionLimiter {
    state: Arc<RateLimitState>,
    action: RateLimitAction,
}

impl ActionLimiter {
    pub fn new(state: Arc<RateLimitState>, action: RateLimitAction) -> Self {
        Self { state, action }
    }
}

/// Rate limiting middleware; use with `middleware::from_fn_with_state`.
pub async fn rate_limit(
    State(limiter): State<ActionLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = limiter
        .state
        .trusted_proxies()
        .client_ip(req.headers(), req.extensions())
        .unwrap_or_else(|| "unknown".to_string());
    let action = limiter.action;

    if let Err(wait) = limiter.state.admit(action, &ip) {
        tracing::warn!(ip = %ip, action = ?action, "Rate limit exceeded");
        // Round up so clients never retry a moment too early.
        let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
        return ApiError::too_many_requests(action.message())
            .retry_after(secs.max(1))
            .into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::ConnectInfo, http::StatusCode, middleware, routing::post, Router};
    use std::net::{IpAddr, SocketAddr};
    use tower::util::ServiceExt;

    fn config(login: u32) -> RateLimitConfig {
        RateLimitConfig {
            login: QuotaConfig::new(login, 900),
            ..Default::default()
        }
    }

    #[test]
    fn test_login_rate_limit() {
        let state = RateLimitState::new(config(3));

        assert!(state.check(RateLimitAction::Login, "127.0.0.1"));
        assert!(state.check(RateLimitAction::Login, "127.0.0.1"));
        assert!(state.check(RateLimitAction::Login, "127.0.0.1"));
        assert!(!state.check(RateLimitAction::Login, "127.0.0.1"));

        // Different IP has its own bucket
        assert!(state.check(RateLimitAction::Login, "192.168.1.1"));
    }

    #[test]
    fn test_actions_are_independent() {
        let state = RateLimitState::new(config(1));
        assert!(state.check(RateLimitAction::Login, "10.0.0.1"));
        assert!(!state.check(RateLimitAction::Login, "10.0.0.1"));
        assert!(state.check(RateLimitAction::Register, "10.0.0.1"));
    }

    #[test]
    fn test_cleanup_keeps_exhausted_bucket() {
        let state = RateLimitState::new(config(3));
        for _ in 0..3 {
            assert!(state.check(RateLimitAction::Login, "127.0.0.1"));
        }
        assert!(!state.check(RateLimitAction::Login, "127.0.0.1"));

        state.cleanup();
        assert!(!state.check(RateLimitAction::Login, "127.0.0.1"));
        assert!(state.check(RateLimitAction::Login, "192.168.1.1"));
    }

    fn limited_app(state: RateLimitState) -> Router {
        Router::new()
            .route("/login", post(|| async { "OK" }))
            .layer(middleware::from_fn_with_state(
                ActionLimiter::new(Arc::new(state), RateLimitAction::Login),
                rate_limit,
            ))
    }

    fn login_from(peer: &str, forwarded: &str) -> Request<Body> {
        let peer: SocketAddr = format!("{peer}:50000").parse().unwrap();
        Request::builder()
            .method("POST")
            .uri("/login")
            .header("X-Forwarded-For", forwarded)
            .extension(ConnectInfo(peer))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_middleware_returns_429() {
        let app = limited_app(RateLimitState::new(config(1)));

        let first = app
            .clone()
            .oneshot(login_from("198.51.100.7", "203.0.113.1"))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        let second = app
            .oneshot(login_from("198.51.100.7", "203.0.113.1"))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry: u64 = second.headers()["retry-after"]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(retry >= 1);
    }

    #[tokio::test]
    async fn test_rotating_forwarded_header_does_not_reset_quota() {
        let app = limited_app(RateLimitState::new(config(1)));

        let mut admitted = 0;
        for i in 0..10 {
            let forwarded = format!("203.0.113.{i}");
            let response = app
                .clone()
                .oneshot(login_from("198.51.100.7", &forwarded))
                .await
                .unwrap();
            if response.status() == StatusCode::OK {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
    }

    #[tokio::test]
    async fn test_trusted_proxy_forwards_client_address() {
        let proxy: IpAddr = "10.0.0.1".parse().unwrap();
        let state =
            RateLimitState::new(config(1)).with_trusted_proxies(TrustedProxies::new([proxy]));
        let app = limited_app(state);

        for (forwarded, expected) in [
            ("203.0.113.1", StatusCode::OK),
            ("203.0.113.2", StatusCode::OK),
            ("203.0.113.1", StatusCode::TOO_MANY_REQUESTS),
        ] {
            let response = app
                .clone()
                .oneshot(login_from("10.0.0.1", forwarded))
                .await
                .unwrap();
            assert_eq!(response.status(), expected, "forwarded for {forwarded}");
        }
    }
}

//! Middleware for Web API.

pub mod auth;
pub mod captcha;
pub mod client_ip;
pub mod cors;
pub mod rate_limit;
pub mod security;

pub use auth::{AuthAccount, ClientOrigin};
pub use captcha::{
    check_captcha, verifier_from_config, CaptchaError, CaptchaVerifier, DisabledCaptcha,
    RecaptchaVerifier,
};
pub use client_ip::TrustedProxies;
pub use cors::{allowed_origins, create_cors_layer};
pub use rate_limit::{rate_limit, ActionLimiter, RateLimitAction, RateLimitState};
pub use security::security_headers;

//! Router configuration for Web API.

use axum::{
    middleware,
    Extension,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    change_password, change_role, forgot_password, get_user, login, logout, me, register,
    resend_verification, reset_password, set_active, verify_email, AppState,
};
use super::middleware::{
    create_cors_layer, rate_limit, security_headers, ActionLimiter, RateLimitAction,
    RateLimitState,
};

/// Create the main API router.
///
/// Every `/api` route shares the general API quota; the sensitive auth
/// routes additionally carry their own per-action quota.
pub fn create_router(
    app_state: Arc<AppState>,
    rate_limits: Arc<RateLimitState>,
    cors_origins: &[String],
) -> Router {
    let limit = |action| {
        middleware::from_fn_with_state(ActionLimiter::new(rate_limits.clone(), action), rate_limit)
    };

    let auth_routes = Router::new()
        .route(
            "/register",
            post(register).layer(limit(RateLimitAction::Register)),
        )
        .route("/login", post(login).layer(limit(RateLimitAction::Login)))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/verify-email/:token", get(verify_email))
        .route(
            "/resend-verification",
            post(resend_verification).layer(limit(RateLimitAction::ResendVerification)),
        )
        .route(
            "/forgotpassword",
            post(forgot_password).layer(limit(RateLimitAction::PasswordReset)),
        )
        .route(
            "/resetpassword/:token",
            put(reset_password).layer(limit(RateLimitAction::PasswordReset)),
        )
        .route("/change-password", put(change_password));

    let user_routes = Router::new()
        .route("/:id", get(get_user))
        .route("/:id/role", put(change_role))
        .route("/:id/active", put(set_active));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .layer(limit(RateLimitAction::Api));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(rate_limits.trusted_proxies().clone()))
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(security_headers)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

//! Authentication handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::auth::{AuthService, RegistrationRequest};
use crate::web::dto::{
    AccountResponse, ChangePasswordRequest, EmailRequest, LoginRequest, LoginResponse,
    MessageResponse, RegisterRequest, RegisterResponse, ResetPasswordRequest, TokenResponse,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::{check_captcha, AuthAccount, CaptchaVerifier, ClientOrigin};

/// Generic forgot-password reply, identical for known and unknown emails.
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent.";

/// Application state shared across handlers.
pub struct AppState {
    /// Account security service.
    pub auth: Arc<AuthService>,
    /// CAPTCHA verifier for register and login.
    pub captcha: Arc<dyn CaptchaVerifier>,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, captcha: Arc<dyn CaptchaVerifier>) -> Self {
        Self { auth, captcha }
    }
}

/// POST /api/auth/register - Create an account and send a verification link.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ClientOrigin(origin): ClientOrigin,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    check_captcha(
        state.captcha.as_ref(),
        req.recaptcha_token.as_deref(),
        origin.ip.as_deref(),
    )
    .await?;

    let mut request = RegistrationRequest::new(req.name, req.email, req.password);
    request.role = req.role;
    let registration = state.auth.register(request, &origin).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "Registration successful! Please check your email to verify your account."
                .to_string(),
            user_id: registration.account.id,
        }),
    ))
}

/// POST /api/auth/login - Email and password login.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ClientOrigin(origin): ClientOrigin,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    check_captcha(
        state.captcha.as_ref(),
        req.recaptcha_token.as_deref(),
        origin.ip.as_deref(),
    )
    .await?;

    let outcome = state.auth.login(&req.email, &req.password, &origin).await?;
    Ok(Json(LoginResponse::from(outcome)))
}

/// POST /api/auth/logout - Record a logout; the client discards its token.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    ClientOrigin(origin): ClientOrigin,
    AuthAccount(account): AuthAccount,
) -> Json<MessageResponse> {
    state.auth.logout(&account, &origin);
    Json(MessageResponse::ok("Logged out successfully"))
}

/// GET /api/auth/me - Current account.
pub async fn me(AuthAccount(account): AuthAccount) -> Json<AccountResponse> {
    Json(AccountResponse::from(account))
}

/// GET /api/auth/verify-email/:token - Confirm an email address.
pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    ClientOrigin(origin): ClientOrigin,
    Path(token): Path<String>,
) -> Result<Json<TokenResponse>, ApiError> {
    let session = state.auth.verify_email(&token, &origin).await?;
    Ok(Json(TokenResponse::new(
        "Email verified successfully! You can now login.",
        session.token,
    )))
}

/// POST /api/auth/resend-verification - Send a new verification link.
pub async fn resend_verification(
    State(state): State<Arc<AppState>>,
    ClientOrigin(origin): ClientOrigin,
    ValidatedJson(req): ValidatedJson<EmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth.resend_verification(&req.email, &origin).await?;
    Ok(Json(MessageResponse::ok(
        "Verification email sent successfully",
    )))
}

/// POST /api/auth/forgotpassword - Start a password reset.
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    ClientOrigin(origin): ClientOrigin,
    ValidatedJson(req): ValidatedJson<EmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth.forgot_password(&req.email, &origin).await?;
    Ok(Json(MessageResponse::ok(FORGOT_PASSWORD_MESSAGE)))
}

/// PUT /api/auth/resetpassword/:token - Set a new password with a reset token.
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    ClientOrigin(origin): ClientOrigin,
    Path(token): Path<String>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let session = state
        .auth
        .reset_password(&token, &req.password, &origin)
        .await?;
    Ok(Json(TokenResponse::new(
        "Password reset successful",
        session.token,
    )))
}

/// PUT /api/auth/change-password - Change the current account's password.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    ClientOrigin(origin): ClientOrigin,
    AuthAccount(account): AuthAccount,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let session = state
        .auth
        .change_password(&account, &req.old_password, &req.new_password, &origin)
        .await?;
    Ok(Json(TokenResponse::new(
        "Password changed successfully",
        session.token,
    )))
}

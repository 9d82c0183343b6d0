//! Auth service error taxonomy.

use thiserror::Error;

use super::password::PasswordError;
use super::permission::AccessError;
use super::session::TokenError;
use super::validation::ValidationError;
use crate::FreshkartError;

/// Which single-use token a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    Verification,
    Reset,
}

impl TokenPurpose {
    fn noun(&self) -> &'static str {
        match self {
            TokenPurpose::Verification => "verification",
            TokenPurpose::Reset => "reset",
        }
    }
}

impl std::fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.noun())
    }
}

/// Errors returned by [`AuthService`](super::AuthService).
///
/// Display strings are the user-facing messages.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Unknown email or wrong password; deliberately indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Login attempted while a lock is in force.
    #[error("Account is locked. Please try again in {remaining_minutes} minutes")]
    Locked { remaining_minutes: i64 },

    /// This failed attempt triggered the lock.
    #[error("Too many failed login attempts. Account locked for {lock_minutes} minutes")]
    LockedOut { lock_minutes: i64 },

    #[error("Account has been deactivated. Please contact support")]
    AccountInactive,

    #[error("User already exists")]
    DuplicateIdentity,

    #[error("Invalid or expired {0} token")]
    InvalidOrExpiredToken(TokenPurpose),

    #[error("Email is already verified")]
    AlreadyVerified,

    /// `{0}` names the missing thing, e.g. "User".
    #[error("{0} not found")]
    NotFound(String),

    #[error("Not authorized, invalid token")]
    InvalidToken,

    #[error("Not authorized, token expired")]
    ExpiredToken,

    #[error("Password was recently changed. Please login again")]
    StaleSession,

    #[error("Current password is incorrect")]
    IncorrectPassword,

    #[error("Not authorized, no token")]
    Unauthenticated,

    #[error("Access denied. {0}")]
    Forbidden(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<FreshkartError> for AuthError {
    fn from(err: FreshkartError) -> Self {
        match err {
            FreshkartError::Duplicate(_) => AuthError::DuplicateIdentity,
            other => AuthError::Internal(other.to_string()),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => AuthError::InvalidToken,
            TokenError::Expired => AuthError::ExpiredToken,
            TokenError::Encoding(msg) => AuthError::Internal(msg),
        }
    }
}

impl From<AccessError> for AuthError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthenticated => AuthError::Unauthenticated,
            AccessError::Forbidden(msg) => AuthError::Forbidden(msg),
            AccessError::NotFound => AuthError::NotFound("Resource".to_string()),
        }
    }
}

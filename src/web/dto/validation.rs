//! Validation utilities for Web API DTOs.

use std::borrow::Cow;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::auth::validation::{
    validate_email, validate_name, validate_password, validate_requested_role, ValidationError,
};
use crate::web::error::ApiError;

/// A JSON extractor that validates the request body.
///
/// This extractor deserializes the request body as JSON and then validates it
/// using the `validator` crate. If validation fails, it returns a detailed
/// error response with field-level error information.
///
/// # Example
///
/// ```ignore
/// use freshkart::web::dto::ValidatedJson;
///
/// async fn login(
///     ValidatedJson(payload): ValidatedJson<LoginRequest>,
/// ) -> Result<Json<LoginResponse>, ApiError> {
///     // payload is already validated
///     // ...
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

// ============================================================================
// Custom Validators
// ============================================================================

fn to_validator_error(err: ValidationError) -> validator::ValidationError {
    validator::ValidationError::new(err.field()).with_message(Cow::Owned(err.to_string()))
}

/// Display name: letters and spaces, 2-50 characters.
pub fn valid_name(value: &str) -> Result<(), validator::ValidationError> {
    validate_name(value).map_err(to_validator_error)
}

pub fn valid_email(value: &str) -> Result<(), validator::ValidationError> {
    validate_email(value).map_err(to_validator_error)
}

/// Password strength rules shared with the auth service.
pub fn valid_password(value: &str) -> Result<(), validator::ValidationError> {
    validate_password(value).map_err(to_validator_error)
}

/// Password must be supplied (no strength rules).
pub fn password_present(value: &str) -> Result<(), validator::ValidationError> {
    if value.is_empty() {
        return Err(to_validator_error(ValidationError::PasswordRequired));
    }
    Ok(())
}

pub fn valid_requested_role(value: &str) -> Result<(), validator::ValidationError> {
    validate_requested_role(Some(value)).map_err(to_validator_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_name() {
        assert!(valid_name("Alice Smith").is_ok());
        let err = valid_name("A").unwrap_err();
        assert_eq!(
            err.message.as_deref(),
            Some("Name must be between 2 and 50 characters")
        );
    }

    #[test]
    fn test_valid_email() {
        assert!(valid_email("bob@example.com").is_ok());
        let err = valid_email("bob").unwrap_err();
        assert_eq!(
            err.message.as_deref(),
            Some("Please provide a valid email address")
        );
    }

    #[test]
    fn test_valid_password() {
        assert!(valid_password("Str0ng!Pass").is_ok());
        assert!(valid_password("weakpass").is_err());
    }

    #[test]
    fn test_password_present() {
        assert!(password_present("x").is_ok());
        let err = password_present("").unwrap_err();
        assert_eq!(err.message.as_deref(), Some("Password is required"));
    }

    #[test]
    fn test_valid_requested_role() {
        assert!(valid_requested_role("buyer").is_ok());
        assert!(valid_requested_role("moderator").is_err());
    }
}

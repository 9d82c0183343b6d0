//! Input validation for FreshKart accounts.
//!
//! These checks run in the auth service regardless of transport; the web
//! DTOs reuse them through `validator` custom functions.

use thiserror::Error;
use validator::ValidateEmail;

/// Minimum display name length.
pub const MIN_NAME_LENGTH: usize = 2;

/// Maximum display name length.
pub const MAX_NAME_LENGTH: usize = 50;

/// Maximum email length.
pub const MAX_EMAIL_LENGTH: usize = 100;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Characters accepted as the "special" class in passwords.
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,

    #[error("Name must be between {MIN_NAME_LENGTH} and {MAX_NAME_LENGTH} characters")]
    NameLength,

    #[error("Name can only contain letters and spaces")]
    NameInvalidChars,

    #[error("Email is required")]
    EmailRequired,

    #[error("Please provide a valid email address")]
    EmailInvalidFormat,

    #[error("Email is too long")]
    EmailTooLong,

    #[error("Password is required")]
    PasswordRequired,

    #[error("Password must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH} characters")]
    PasswordLength,

    #[error("Password must contain at least one lowercase letter")]
    PasswordNoLowercase,

    #[error("Password must contain at least one uppercase letter")]
    PasswordNoUppercase,

    #[error("Password must contain at least one number")]
    PasswordNoDigit,

    #[error("Password must contain at least one special character")]
    PasswordNoSpecial,

    #[error("New password must be different from current password")]
    PasswordUnchanged,

    #[error("Invalid role. Must be either buyer or seller")]
    InvalidRole,
}

impl ValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::NameRequired
            | ValidationError::NameLength
            | ValidationError::NameInvalidChars => "name",
            ValidationError::EmailRequired
            | ValidationError::EmailInvalidFormat
            | ValidationError::EmailTooLong => "email",
            ValidationError::InvalidRole => "role",
            _ => "password",
        }
    }
}

/// Validate a display name: 2-50 characters, letters and spaces only.
///
/// # Examples
///
/// ```
/// use freshkart::auth::validation::validate_name;
///
/// assert!(validate_name("Alice Smith").is_ok());
/// assert!(validate_name("A").is_err());
/// assert!(validate_name("R2D2").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    let len = name.chars().count();
    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&len) {
        return Err(ValidationError::NameLength);
    }
    if !name.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
        return Err(ValidationError::NameInvalidChars);
    }
    Ok(())
}

/// Validate an email address: well-formed and at most 100 characters.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if !email.validate_email() {
        return Err(ValidationError::EmailInvalidFormat);
    }
    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }
    Ok(())
}

/// Validate password strength.
///
/// Requirements:
/// - Length: 8-128 characters
/// - At least one lowercase letter, one uppercase letter and one digit
/// - At least one of `!@#$%^&*(),.?":{}|<>`
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    let len = password.chars().count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&len) {
        return Err(ValidationError::PasswordLength);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ValidationError::PasswordNoLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::PasswordNoUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::PasswordNoDigit);
    }
    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        return Err(ValidationError::PasswordNoSpecial);
    }
    Ok(())
}

/// Validate a password change: the new password must be strong and differ
/// from the current one.
pub fn validate_password_change(current: &str, new: &str) -> Result<(), ValidationError> {
    validate_password(new)?;
    if super::password::secrets_equal(current, new) {
        return Err(ValidationError::PasswordUnchanged);
    }
    Ok(())
}

/// Validate an optional self-service role request.
pub fn validate_requested_role(role: Option<&str>) -> Result<(), ValidationError> {
    match role {
        None | Some("buyer") | Some("seller") => Ok(()),
        Some(_) => Err(ValidationError::InvalidRole),
    }
}

/// Validate all registration fields, returning the first failure.
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), ValidationError> {
    validate_name(name)?;
    validate_email(email)?;
    validate_password(password)?;
    Ok(())
}

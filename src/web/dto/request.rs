//! Request DTOs for the auth API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{
    password_present, valid_email, valid_name, valid_password, valid_requested_role,
};
use crate::db::{Permission, Role};

/// User registration request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(custom(function = "valid_name"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "valid_email"))]
    pub email: String,
    #[serde(default)]
    #[validate(custom(function = "valid_password"))]
    pub password: String,
    /// `buyer` or `seller`; defaults to buyer.
    #[serde(default)]
    #[validate(custom(function = "valid_requested_role"))]
    pub role: Option<String>,
    #[serde(default)]
    pub recaptcha_token: Option<String>,
}

/// Login request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(custom(function = "valid_email"))]
    pub email: String,
    #[serde(default)]
    #[validate(custom(function = "password_present"))]
    pub password: String,
    #[serde(default)]
    pub recaptcha_token: Option<String>,
}

/// Request carrying only an email address (resend verification, forgot password).
#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    #[serde(default)]
    #[validate(custom(function = "valid_email"))]
    pub email: String,
}

/// Password reset request; the token is in the path.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    #[validate(custom(function = "valid_password"))]
    pub password: String,
}

/// Authenticated password change.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    #[validate(custom(function = "password_present"))]
    pub old_password: String,
    #[serde(default)]
    #[validate(custom(function = "valid_password"))]
    pub new_password: String,
}

/// Role change request.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangeRoleRequest {
    pub role: Role,
    /// Explicit permission set; defaults to the role's standard set.
    #[serde(default)]
    pub permissions: Option<Vec<Permission>>,
}

/// Activate or deactivate an account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveRequest {
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_camel_case() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":"Alice","email":"alice@example.com","password":"Str0ng!Pass","role":"seller","recaptchaToken":"tok"}"#,
        )
        .unwrap();
        assert_eq!(req.role.as_deref(), Some("seller"));
        assert_eq!(req.recaptcha_token.as_deref(), Some("tok"));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_request_rejects_admin_role() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":"Alice","email":"alice@example.com","password":"Str0ng!Pass","role":"admin"}"#,
        )
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("role"));
    }

    #[test]
    fn test_register_request_missing_fields() {
        let req: RegisterRequest = serde_json::from_str("{}").unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_change_password_field_names() {
        let req: ChangePasswordRequest =
            serde_json::from_str(r#"{"oldPassword":"Old!Pass1","newPassword":"weak"}"#).unwrap();
        assert_eq!(req.old_password, "Old!Pass1");
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("new_password"));
    }

    #[test]
    fn test_change_role_request() {
        let req: ChangeRoleRequest =
            serde_json::from_str(r#"{"role":"seller","permissions":["manage_products"]}"#)
                .unwrap();
        assert_eq!(req.role, Role::Seller);
        assert_eq!(req.permissions, Some(vec![Permission::ManageProducts]));
        assert!(serde_json::from_str::<ChangeRoleRequest>(r#"{"role":"root"}"#).is_err());
    }

    #[test]
    fn test_set_active_request() {
        let req: SetActiveRequest = serde_json::from_str(r#"{"isActive":false}"#).unwrap();
        assert!(!req.is_active);
    }
}

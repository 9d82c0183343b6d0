//! Response DTOs for the auth API.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::LoginOutcome;
use crate::db::{Account, AccountStatus, Permission, Role};

/// `{ success, message }` acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Registration response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user_id: i64,
}

/// Acknowledgement carrying a fresh session token.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub message: String,
    /// Session token (JWT).
    pub token: String,
}

impl TokenResponse {
    pub fn new(message: impl Into<String>, token: String) -> Self {
        Self {
            success: true,
            message: message.into(),
            token,
        }
    }
}

/// Login response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub permissions: Vec<Permission>,
    pub is_admin: bool,
    pub email_verified: bool,
    /// True when the account has not verified its email yet.
    pub email_verified_warning: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub token: String,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        let account = outcome.account;
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            role: account.role,
            permissions: account.permissions,
            is_admin: account.is_admin,
            email_verified: account.email_verified,
            email_verified_warning: outcome.email_verified_warning,
            last_login: account.last_login_at,
            token: outcome.token,
        }
    }
}

/// Public view of an account. Never includes secrets or token hashes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub permissions: Vec<Permission>,
    pub is_admin: bool,
    pub status: AccountStatus,
    pub email_verified: bool,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            role: account.role,
            permissions: account.permissions,
            is_admin: account.is_admin,
            status: account.status,
            email_verified: account.email_verified,
            is_active: account.is_active,
            last_login: account.last_login_at,
            created_at: account.created_at,
        }
    }
}

//! Account model for FreshKart.
//!
//! Defines the stored account record together with its role, permission and
//! status vocabularies.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::from_millis;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Shopper.
    #[default]
    Buyer,
    /// Merchant listing products.
    Seller,
    /// Staff moderator.
    Moderator,
    /// Administrator.
    Admin,
}

impl Role {
    /// All roles, lowest rank first.
    pub const ALL: [Role; 4] = [Role::Buyer, Role::Seller, Role::Moderator, Role::Admin];

    /// Convert role to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    /// Position in the role hierarchy (admin 4 > moderator 3 > seller 2 > buyer 1).
    pub fn rank(&self) -> u8 {
        match self {
            Role::Buyer => 1,
            Role::Seller => 2,
            Role::Moderator => 3,
            Role::Admin => 4,
        }
    }

    /// Whether this role strictly outranks `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use freshkart::db::Role;
    ///
    /// assert!(Role::Moderator.outranks(Role::Seller));
    /// assert!(!Role::Seller.outranks(Role::Seller));
    /// ```
    pub fn outranks(&self, other: Role) -> bool {
        self.rank() > other.rank()
    }

    /// Roles a visitor may pick for themselves at registration.
    pub fn is_self_assignable(&self) -> bool {
        matches!(self, Role::Buyer | Role::Seller)
    }

    /// Resolve a requested registration role: buyer or seller are honoured,
    /// anything else (including nothing) falls back to buyer.
    pub fn for_registration(requested: Option<&str>) -> Role {
        requested
            .and_then(|s| s.parse::<Role>().ok())
            .filter(Role::is_self_assignable)
            .unwrap_or(Role::Buyer)
    }

    /// Permissions granted when an account is given this role.
    pub fn default_permissions(&self) -> Vec<Permission> {
        match self {
            Role::Buyer => Vec::new(),
            Role::Seller => vec![
                Permission::ManageProducts,
                Permission::ManageOrders,
                Permission::ViewAnalytics,
            ],
            Role::Moderator => vec![Permission::ManageUsers, Permission::ManageCategories],
            // Admin passes every permission check without stored grants.
            Role::Admin => Vec::new(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buyer" => Ok(Role::Buyer),
            "seller" => Ok(Role::Seller),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// Fine-grained capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ManageProducts,
    ManageOrders,
    ManageUsers,
    ViewAnalytics,
    ManageCategories,
}

impl Permission {
    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageProducts => "manage_products",
            Permission::ManageOrders => "manage_orders",
            Permission::ManageUsers => "manage_users",
            Permission::ViewAnalytics => "view_analytics",
            Permission::ManageCategories => "manage_categories",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manage_products" => Ok(Permission::ManageProducts),
            "manage_orders" => Ok(Permission::ManageOrders),
            "manage_users" => Ok(Permission::ManageUsers),
            "view_analytics" => Ok(Permission::ViewAnalytics),
            "manage_categories" => Ok(Permission::ManageCategories),
            _ => Err(format!("unknown permission: {s}")),
        }
    }
}

/// Encode a permission set for the `permissions` column.
pub(crate) fn encode_permissions(permissions: &[Permission]) -> String {
    permissions
        .iter()
        .map(Permission::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Decode the `permissions` column, skipping unknown entries.
pub(crate) fn decode_permissions(raw: &str) -> Vec<Permission> {
    raw.split(',')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}

/// Account lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    PendingVerification,
    Active,
    Suspended,
    Locked,
}

impl AccountStatus {
    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::PendingVerification => "pending_verification",
            AccountStatus::Active => "active",
            AccountStatus::Suspended => "suspended",
            AccountStatus::Locked => "locked",
        }
    }

    /// Status an unlocked account settles into given its verification state.
    pub fn settled(email_verified: bool) -> Self {
        if email_verified {
            AccountStatus::Active
        } else {
            AccountStatus::PendingVerification
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_verification" => Ok(AccountStatus::PendingVerification),
            "active" => Ok(AccountStatus::Active),
            "suspended" => Ok(AccountStatus::Suspended),
            "locked" => Ok(AccountStatus::Locked),
            _ => Err(format!("unknown account status: {s}")),
        }
    }
}

/// A stored account.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub name: String,
    /// Trimmed, lower-cased email address.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub role: Role,
    pub permissions: Vec<Permission>,
    /// Always equal to `role == Role::Admin`.
    pub is_admin: bool,
    pub status: AccountStatus,
    pub email_verified: bool,
    /// SHA-256 hex of the outstanding verification token.
    pub email_verification_token: Option<String>,
    pub email_verification_expires_at: Option<DateTime<Utc>>,
    /// SHA-256 hex of the outstanding reset token.
    pub reset_password_token: Option<String>,
    pub reset_password_expires_at: Option<DateTime<Utc>>,
    pub login_attempts: u32,
    pub lock_until: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_login_ip: Option<String>,
    pub password_changed_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Whether a lock is in force at `now`.
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.lock_until.is_some_and(|until| until > now)
    }

    /// Whether the account has a stored grant (admins pass implicitly).
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.is_admin || self.permissions.contains(&permission)
    }
}

/// Raw `accounts` row as stored in SQLite.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct AccountRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    permissions: String,
    is_admin: bool,
    status: String,
    email_verified: bool,
    email_verification_token: Option<String>,
    email_verification_expires_at: Option<i64>,
    reset_password_token: Option<String>,
    reset_password_expires_at: Option<i64>,
    login_attempts: i64,
    lock_until: Option<i64>,
    last_login_at: Option<i64>,
    last_login_ip: Option<String>,
    password_changed_at: Option<i64>,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<AccountRow> for Account {
    type Error = String;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse()?,
            permissions: decode_permissions(&row.permissions),
            is_admin: row.is_admin,
            status: row.status.parse()?,
            email_verified: row.email_verified,
            email_verification_token: row.email_verification_token,
            email_verification_expires_at: row.email_verification_expires_at.map(from_millis),
            reset_password_token: row.reset_password_token,
            reset_password_expires_at: row.reset_password_expires_at.map(from_millis),
            login_attempts: u32::try_from(row.login_attempts).unwrap_or(0),
            lock_until: row.lock_until.map(from_millis),
            last_login_at: row.last_login_at.map(from_millis),
            last_login_ip: row.last_login_ip,
            password_changed_at: row.password_changed_at.map(from_millis),
            is_active: row.is_active,
            created_at: from_millis(row.created_at),
            updated_at: from_millis(row.updated_at),
        })
    }
}

/// Data for creating a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    /// Normalized before storage.
    pub email: String,
    /// Pre-hashed with Argon2.
    pub password_hash: String,
    pub role: Role,
    pub permissions: Vec<Permission>,
    pub status: AccountStatus,
    pub email_verified: bool,
}

impl NewAccount {
    /// Create a buyer awaiting email verification.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role: Role::Buyer,
            permissions: Vec::new(),
            status: AccountStatus::PendingVerification,
            email_verified: false,
        }
    }

    /// Set the role and its default permissions.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self.permissions = role.default_permissions();
        self
    }

    /// Mark the email as already verified and the account active.
    pub fn verified(mut self) -> Self {
        self.email_verified = true;
        self.status = AccountStatus::Active;
        self
    }
}

/// Normalize an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_account() -> Account {
        let now = from_millis(1_700_000_000_000);
        Account {
            id: 1,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: Role::Buyer,
            permissions: Vec::new(),
            is_admin: false,
            status: AccountStatus::Active,
            email_verified: true,
            email_verification_token: None,
            email_verification_expires_at: None,
            reset_password_token: None,
            reset_password_expires_at: None,
            login_attempts: 0,
            lock_until: None,
            last_login_at: None,
            last_login_ip: None,
            password_changed_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_role_rank_order() {
        assert!(Role::Admin.outranks(Role::Moderator));
        assert!(Role::Moderator.outranks(Role::Seller));
        assert!(Role::Seller.outranks(Role::Buyer));
        assert!(!Role::Buyer.outranks(Role::Buyer));
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("buyer".parse::<Role>().unwrap(), Role::Buyer);
        assert_eq!("SELLER".parse::<Role>().unwrap(), Role::Seller);
        assert_eq!("moderator".parse::<Role>().unwrap(), Role::Moderator);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_registration_role_resolution() {
        assert_eq!(Role::for_registration(None), Role::Buyer);
        assert_eq!(Role::for_registration(Some("seller")), Role::Seller);
        assert_eq!(Role::for_registration(Some("admin")), Role::Buyer);
        assert_eq!(Role::for_registration(Some("moderator")), Role::Buyer);
        assert_eq!(Role::for_registration(Some("nonsense")), Role::Buyer);
    }

    #[test]
    fn test_seller_default_permissions() {
        let perms = Role::Seller.default_permissions();
        assert_eq!(
            perms,
            vec![
                Permission::ManageProducts,
                Permission::ManageOrders,
                Permission::ViewAnalytics
            ]
        );
        assert!(Role::Buyer.default_permissions().is_empty());
    }

    #[test]
    fn test_permission_encoding() {
        let perms = vec![Permission::ManageOrders, Permission::ViewAnalytics];
        let encoded = encode_permissions(&perms);
        assert_eq!(encoded, "manage_orders,view_analytics");
        assert_eq!(decode_permissions(&encoded), perms);
        assert!(decode_permissions("").is_empty());
        assert_eq!(
            decode_permissions("manage_users,bogus"),
            vec![Permission::ManageUsers]
        );
    }

    #[test]
    fn test_status_settled() {
        assert_eq!(AccountStatus::settled(true), AccountStatus::Active);
        assert_eq!(
            AccountStatus::settled(false),
            AccountStatus::PendingVerification
        );
    }

    #[test]
    fn test_is_locked() {
        let now = from_millis(1_700_000_000_000);
        let mut account = sample_account();
        assert!(!account.is_locked(now));

        account.lock_until = Some(now + Duration::minutes(15));
        assert!(account.is_locked(now));
        assert!(account.is_locked(now + Duration::minutes(14)));
        assert!(!account.is_locked(now + Duration::minutes(15)));
    }

    #[test]
    fn test_admin_has_every_permission() {
        let mut account = sample_account();
        assert!(!account.has_permission(Permission::ManageUsers));
        account.role = Role::Admin;
        account.is_admin = true;
        assert!(account.has_permission(Permission::ManageUsers));
    }

    #[test]
    fn test_new_account_builder() {
        let new = NewAccount::new("Bob", "bob@example.com", "hash")
            .with_role(Role::Seller)
            .verified();
        assert_eq!(new.role, Role::Seller);
        assert_eq!(new.permissions.len(), 3);
        assert!(new.email_verified);
        assert_eq!(new.status, AccountStatus::Active);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }
}

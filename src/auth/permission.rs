//! Role-based access control for FreshKart.
//!
//! Every check takes the caller as `Option<&Account>`; `None` means the
//! request is unauthenticated. Administrators pass the permission,
//! ownership and hierarchy checks unconditionally.

use thiserror::Error;

use crate::db::{Account, Permission, Role};

/// Access control errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No authenticated caller.
    #[error("Not authorized, no user found")]
    Unauthenticated,

    /// Caller lacks the role, permission, ownership or rank.
    #[error("Access denied. {0}")]
    Forbidden(String),

    /// The resource to check ownership of does not exist.
    #[error("Resource not found")]
    NotFound,
}

/// A resource owned by an account.
pub trait Owned {
    /// ID of the owning account.
    fn owner_id(&self) -> i64;
}

impl Owned for Account {
    fn owner_id(&self) -> i64 {
        self.id
    }
}

fn caller(identity: Option<&Account>) -> Result<&Account, AccessError> {
    identity.ok_or(AccessError::Unauthenticated)
}

/// Require the caller's role to be one of `allowed`.
///
/// # Examples
///
/// ```
/// use freshkart::auth::permission::{require_role, AccessError};
/// use freshkart::db::Role;
///
/// assert_eq!(
///     require_role(None, &[Role::Admin]),
///     Err(AccessError::Unauthenticated)
/// );
/// ```
pub fn require_role(identity: Option<&Account>, allowed: &[Role]) -> Result<(), AccessError> {
    let account = caller(identity)?;
    if allowed.contains(&account.role) {
        return Ok(());
    }
    let names: Vec<&str> = allowed.iter().map(Role::as_str).collect();
    Err(AccessError::Forbidden(format!(
        "Required role: {}",
        names.join(" or ")
    )))
}

/// Require a permission grant (administrators always pass).
pub fn require_permission(
    identity: Option<&Account>,
    permission: Permission,
) -> Result<(), AccessError> {
    let account = caller(identity)?;
    if account.has_permission(permission) {
        return Ok(());
    }
    Err(AccessError::Forbidden(format!(
        "Required permission: {permission}"
    )))
}

/// Require the caller to own `resource` (administrators always pass).
pub fn require_ownership<R: Owned + ?Sized>(
    identity: Option<&Account>,
    resource: Option<&R>,
) -> Result<(), AccessError> {
    let account = caller(identity)?;
    if account.is_admin {
        return Ok(());
    }
    let resource = resource.ok_or(AccessError::NotFound)?;
    if resource.owner_id() == account.id {
        return Ok(());
    }
    Err(AccessError::Forbidden(
        "You do not own this resource".to_string(),
    ))
}

/// Require the caller to strictly outrank `target` (administrators always pass).
pub fn require_higher_role(identity: Option<&Account>, target: Role) -> Result<(), AccessError> {
    let account = caller(identity)?;
    if account.is_admin || account.role.outranks(target) {
        return Ok(());
    }
    Err(AccessError::Forbidden(
        "Insufficient role privileges".to_string(),
    ))
}

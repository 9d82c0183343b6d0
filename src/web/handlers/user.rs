//! Account administration handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::web::dto::{AccountResponse, ChangeRoleRequest, SetActiveRequest, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AuthAccount, ClientOrigin};

/// GET /api/users/:id - Account profile (owner or admin).
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    AuthAccount(caller): AuthAccount,
    Path(id): Path<i64>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.auth.get_account(&caller, id).await?;
    Ok(Json(AccountResponse::from(account)))
}

/// PUT /api/users/:id/role - Change role and permissions.
pub async fn change_role(
    State(state): State<Arc<AppState>>,
    ClientOrigin(origin): ClientOrigin,
    AuthAccount(caller): AuthAccount,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<ChangeRoleRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state
        .auth
        .change_role(&caller, id, req.role, req.permissions, &origin)
        .await?;
    Ok(Json(AccountResponse::from(account)))
}

/// PUT /api/users/:id/active - Activate or deactivate an account (admin).
pub async fn set_active(
    State(state): State<Arc<AppState>>,
    ClientOrigin(origin): ClientOrigin,
    AuthAccount(caller): AuthAccount,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<SetActiveRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state
        .auth
        .set_active(&caller, id, req.is_active, &origin)
        .await?;
    Ok(Json(AccountResponse::from(account)))
}

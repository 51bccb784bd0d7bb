//! User directory handlers.
//!
//! Accounts are provisioned by the upstream identity service; this
//! surface only keeps the local directory that commissions reference.

use atelier_core::roles::validate_role;
use atelier_core::types::DbId;
use atelier_core::CoreError;
use atelier_db::models::user::CreateUser;
use atelier_db::repositories::UserRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/users
///
/// Register a user in the directory. Called by the identity service, so
/// it carries no `x-user-id` of its own.
pub async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<impl IntoResponse> {
    validate_role(&input.role)?;
    if input.username.trim().is_empty() {
        return Err(CoreError::Validation("Username cannot be empty".to_string()).into());
    }
    if !input.email.contains('@') {
        return Err(CoreError::Validation("Email address is not valid".to_string()).into());
    }

    let user = UserRepo::create(&state.pool, &input).await?;

    tracing::info!(user_id = user.id, role = %user.role, "user created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;
    Ok(Json(DataResponse { data: user }))
}

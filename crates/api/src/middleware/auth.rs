//! Caller identity extraction.
//!
//! Authentication happens upstream; the gateway forwards the caller's id
//! in the `x-user-id` header. The extractor resolves that id against the
//! user directory so handlers always see a live account and its role.

use atelier_core::types::DbId;
use atelier_core::CoreError;
use atelier_db::repositories::UserRepo;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// Header set by the upstream gateway after it authenticates the caller.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Resolved identity of the requesting user.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        atelier_core::roles::is_admin(&self.role)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| CoreError::Unauthorized("Missing x-user-id header".to_string()))?;

        let user_id: DbId = raw
            .parse()
            .map_err(|_| CoreError::Unauthorized("Invalid x-user-id header".to_string()))?;

        let user = UserRepo::find_by_id(&state.pool, user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| CoreError::Unauthorized("Unknown or inactive user".to_string()))?;

        Ok(AuthUser {
            user_id: user.id,
            role: user.role,
        })
    }
}

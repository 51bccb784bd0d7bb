//! API error type and HTTP response mapping.

use atelier_core::CoreError;
use atelier_db::DbError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by route handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Domain error from the commission lifecycle.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage error from the database layer.
    #[error(transparent)]
    Database(#[from] DbError),

    /// Malformed request outside the domain layer's reach.
    #[error("{0}")]
    BadRequest(String),

    /// Unexpected internal failure.
    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(err) => classify_core_error(err),
            AppError::Database(err) => classify_db_error(err),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        CoreError::Validation(_) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
        }
        CoreError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT", err.to_string()),
        CoreError::Unauthorized(_) => {
            (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", err.to_string())
        }
        CoreError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN", err.to_string()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "internal domain error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            )
        }
    }
}

fn classify_db_error(err: &DbError) -> (StatusCode, &'static str, String) {
    match err {
        DbError::Sqlx(sqlx::Error::RowNotFound) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        DbError::Sqlx(sqlx::Error::Database(db_err)) => {
            // Unique constraints follow the uq_* naming convention.
            let is_unique_violation = db_err.code().as_deref() == Some("23505")
                || db_err
                    .constraint()
                    .is_some_and(|name| name.starts_with("uq_"));
            if is_unique_violation {
                (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    "A record with this value already exists".to_string(),
                )
            } else {
                tracing::error!(error = %db_err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
        }
        DbError::Sqlx(other) => {
            tracing::error!(error = %other, "database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "A database error occurred".to_string(),
            )
        }
        DbError::Corrupt(msg) => {
            tracing::error!(error = %msg, "corrupt stored data");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATA_ERROR",
                "Stored data could not be read".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_expected_statuses() {
        let cases = [
            (
                CoreError::NotFound {
                    entity: "Commission",
                    id: 7,
                },
                StatusCode::NOT_FOUND,
            ),
            (
                CoreError::Validation("bad input".into()),
                StatusCode::BAD_REQUEST,
            ),
            (CoreError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                CoreError::Unauthorized("who".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (CoreError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (
                CoreError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let (status, _, _) = classify_core_error(&err);
            assert_eq!(status, expected, "wrong status for {err:?}");
        }
    }

    #[test]
    fn row_not_found_maps_to_404() {
        let err = DbError::Sqlx(sqlx::Error::RowNotFound);
        let (status, code, _) = classify_db_error(&err);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
    }

    #[test]
    fn corrupt_data_maps_to_500() {
        let err = DbError::Corrupt("commission 3: invalid payment document".into());
        let (status, code, message) = classify_db_error(&err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "DATA_ERROR");
        // Internal detail stays out of the response body.
        assert!(!message.contains("commission 3"));
    }

    #[test]
    fn domain_detail_survives_into_message() {
        let err = CoreError::Validation("Budget minimum cannot exceed maximum".into());
        let (_, _, message) = classify_core_error(&err);
        assert_eq!(
            message,
            "Validation failed: Budget minimum cannot exceed maximum"
        );
    }
}

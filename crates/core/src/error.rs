//! Domain error taxonomy.
//!
//! Lifecycle operations return these directly; the API layer maps each
//! variant onto an HTTP status in `atelier-api`.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A referenced entity (commission, user, milestone, progress entry)
    /// does not exist. Maps to 404.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// The request is well-formed but breaks a domain rule, including
    /// illegal status transitions. Maps to 400.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The request collides with existing state, such as a duplicate
    /// username or email. Maps to 409.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Caller identity is missing or could not be resolved. Maps to 401.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is known but is not allowed to act on this commission.
    /// Maps to 403.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Invariant breakage on our side, such as stored data that no longer
    /// decodes. Maps to 500.
    #[error("Internal error: {0}")]
    Internal(String),
}

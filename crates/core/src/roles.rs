//! Well-known user roles.
//!
//! Role names must stay in sync with the CHECK constraint on `users.role`
//! in the `create_users` migration.

use crate::error::CoreError;

/// Buyer side: requests commissions, accepts quotes, reviews progress.
pub const ROLE_CLIENT: &str = "client";

/// Seller side: submits quotes, uploads progress, completes milestones.
pub const ROLE_ARTIST: &str = "artist";

/// Platform operator: may read any commission.
pub const ROLE_ADMIN: &str = "admin";

pub const VALID_ROLES: &[&str] = &[ROLE_CLIENT, ROLE_ARTIST, ROLE_ADMIN];

pub fn is_artist(role: &str) -> bool {
    role == ROLE_ARTIST
}

pub fn is_admin(role: &str) -> bool {
    role == ROLE_ADMIN
}

pub fn validate_role(role: &str) -> Result<(), CoreError> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid role '{role}', expected one of: {}",
            VALID_ROLES.join(", ")
        )))
    }
}

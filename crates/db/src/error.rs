//! Error type for repository operations.

/// Everything a repository can fail with. Driver errors pass through
/// untouched so the API layer can classify them (not-found, unique
/// violations); `Corrupt` means a stored JSONB document no longer matches
/// the domain schema and is always a server-side bug.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("Stored data corrupt: {0}")]
    Corrupt(String),
}

//! Shared primitive type aliases.

/// Database primary key. All tables use PostgreSQL `BIGSERIAL`.
pub type DbId = i64;

/// All timestamps are stored and exchanged in UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

//! Pure domain logic for the Atelier commission marketplace.
//!
//! Everything in this crate is synchronous and I/O-free: lifecycle
//! transitions take a commission value plus a typed request and return a
//! new value, so the rules are testable without a database. Persistence
//! lives in `atelier-db`, the HTTP surface in `atelier-api`.

pub mod commission;
pub mod error;
pub mod roles;
pub mod types;

pub use error::CoreError;

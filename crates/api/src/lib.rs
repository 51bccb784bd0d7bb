//! HTTP API for the commission marketplace.
//!
//! Exposes the commission lifecycle over REST, resolves caller identity
//! from the gateway-supplied `x-user-id` header, and forwards lifecycle
//! notifications onto the platform event bus.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notifications;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{AppError, AppResult};
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users as handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_user))
        .route("/{id}", get(handlers::get_user))
}

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::commissions as handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::request_commission).get(handlers::list_commissions),
        )
        .route("/stats", get(handlers::commission_stats))
        .route("/{id}", get(handlers::get_commission))
        .route("/{id}/messages", post(handlers::add_message))
        .route("/{id}/quote", post(handlers::submit_quote))
        .route("/{id}/accept", post(handlers::accept_quote))
        .route("/{id}/progress", post(handlers::upload_progress))
        .route(
            "/{id}/progress/{index}/review",
            post(handlers::review_progress),
        )
        .route(
            "/{id}/milestones/{index}/complete",
            post(handlers::complete_milestone),
        )
        .route("/{id}/status", put(handlers::update_status))
        .route("/{id}/reviews", post(handlers::add_review))
}

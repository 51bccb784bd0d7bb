//! Route table for the versioned API.
//!
//! | Method | Path                                              | Action                      |
//! |--------|---------------------------------------------------|-----------------------------|
//! | POST   | `/api/v1/users`                                   | register a user             |
//! | GET    | `/api/v1/users/{id}`                              | fetch a user                |
//! | POST   | `/api/v1/commissions`                             | request a commission        |
//! | GET    | `/api/v1/commissions`                             | list caller's commissions   |
//! | GET    | `/api/v1/commissions/stats`                       | caller's commission stats   |
//! | GET    | `/api/v1/commissions/{id}`                        | fetch one commission        |
//! | POST   | `/api/v1/commissions/{id}/messages`               | post a message              |
//! | POST   | `/api/v1/commissions/{id}/quote`                  | submit a quote              |
//! | POST   | `/api/v1/commissions/{id}/accept`                 | accept the quote            |
//! | POST   | `/api/v1/commissions/{id}/progress`               | upload progress             |
//! | POST   | `/api/v1/commissions/{id}/progress/{i}/review`    | review a progress entry     |
//! | POST   | `/api/v1/commissions/{id}/milestones/{i}/complete`| complete a milestone        |
//! | PUT    | `/api/v1/commissions/{id}/status`                 | change lifecycle status     |
//! | POST   | `/api/v1/commissions/{id}/reviews`                | leave a final review        |

pub mod commissions;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Everything mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/commissions", commissions::routes())
        .nest("/users", users::routes())
}

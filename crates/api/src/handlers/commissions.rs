//! Commission endpoint handlers.
//!
//! Every mutating handler follows the same shape: load the aggregate,
//! run the pure lifecycle operation, persist the returned commission in
//! one statement, then publish the notification intents onto the event
//! bus. Handlers never mutate commission state themselves.

use atelier_core::commission::lifecycle::{
    self, RequestCommission, ReviewProgress, SendMessage, SubmitQuote, SubmitReview, UpdateStatus,
    UploadProgress, UserRef,
};
use atelier_core::commission::{Commission, CommissionStatus, NotificationIntent, Transition};
use atelier_core::types::DbId;
use atelier_core::CoreError;
use atelier_db::models::commission::Party;
use atelier_db::repositories::{clamp_limit, clamp_offset, CommissionRepo, UserRepo};
use atelier_db::DbPool;
use atelier_events::PlatformEvent;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /api/v1/commissions`.
#[derive(Debug, Deserialize)]
pub struct CommissionListParams {
    /// Narrow to a single lifecycle status.
    pub status: Option<CommissionStatus>,
    /// Narrow to one side of the table (`client` or `artist`).
    pub role: Option<Party>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/commissions
///
/// A client requests a commission from an artist. A target that is
/// missing, deactivated, or not an artist reports the artist as not
/// found.
pub async fn request_commission(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<RequestCommission>,
) -> AppResult<impl IntoResponse> {
    let artist_id = input.artist_id;
    let artist = UserRepo::find_by_id(&state.pool, artist_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Artist",
            id: artist_id,
        })?;
    let artist_ref = UserRef {
        id: artist.id,
        role: artist.role,
        is_active: artist.is_active,
    };

    let (new_commission, notifications) =
        lifecycle::request_commission(auth.user_id, &artist_ref, input, Utc::now())?;
    let commission = CommissionRepo::insert(&state.pool, &new_commission).await?;
    publish_notifications(&state, &commission, auth.user_id, &notifications);

    tracing::info!(
        commission_id = commission.id,
        client_id = commission.client_id,
        artist_id = commission.artist_id,
        "commission requested"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: commission }),
    ))
}

/// GET /api/v1/commissions
///
/// List the caller's commissions newest-first, optionally filtered by
/// status and by which side of the commission they are on.
pub async fn list_commissions(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<CommissionListParams>,
) -> AppResult<impl IntoResponse> {
    let summaries = CommissionRepo::list_for_user(
        &state.pool,
        auth.user_id,
        params.status,
        params.role,
        clamp_limit(params.limit),
        clamp_offset(params.offset),
    )
    .await?;

    Ok(Json(DataResponse { data: summaries }))
}

/// GET /api/v1/commissions/stats
///
/// Per-status counts and value totals across the caller's commissions.
pub async fn commission_stats(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let stats = CommissionRepo::stats_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/commissions/{id}
///
/// Full aggregate, including the communication and progress logs. Only
/// the participants and admins may read it.
pub async fn get_commission(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let commission = load_commission(&state.pool, id).await?;
    if !commission.is_participant(auth.user_id) && !auth.is_admin() {
        return Err(CoreError::Forbidden(
            "Only the commission's participants may view it".to_string(),
        )
        .into());
    }
    Ok(Json(DataResponse { data: commission }))
}

/// POST /api/v1/commissions/{id}/messages
///
/// Append a message to the communication log. Allowed in any status so
/// the thread stays usable after the commission closes.
pub async fn add_message(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SendMessage>,
) -> AppResult<impl IntoResponse> {
    let commission = load_commission(&state.pool, id).await?;
    let transition = lifecycle::add_message(&commission, auth.user_id, input, Utc::now())?;
    let saved = persist(&state, auth.user_id, transition).await?;

    tracing::info!(
        commission_id = saved.id,
        sender_id = auth.user_id,
        "message added"
    );

    Ok(Json(DataResponse { data: saved }))
}

/// POST /api/v1/commissions/{id}/quote
///
/// The artist proposes a price, and optionally a timeline and milestone
/// plan. Moves the commission to `quoted`.
pub async fn submit_quote(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SubmitQuote>,
) -> AppResult<impl IntoResponse> {
    let commission = load_commission(&state.pool, id).await?;
    let transition = lifecycle::submit_quote(&commission, auth.user_id, input, Utc::now())?;
    let saved = persist(&state, auth.user_id, transition).await?;

    tracing::info!(
        commission_id = saved.id,
        artist_id = auth.user_id,
        proposed_price = ?saved.proposed_price,
        "quote submitted"
    );

    Ok(Json(DataResponse { data: saved }))
}

/// POST /api/v1/commissions/{id}/accept
///
/// The client accepts the standing quote. Locks the agreed price and
/// derives the payment schedule in the same operation.
pub async fn accept_quote(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let commission = load_commission(&state.pool, id).await?;
    let transition = lifecycle::accept_quote(&commission, auth.user_id, Utc::now())?;
    let saved = persist(&state, auth.user_id, transition).await?;

    tracing::info!(
        commission_id = saved.id,
        client_id = auth.user_id,
        agreed_price = ?saved.agreed_price,
        "quote accepted"
    );

    Ok(Json(DataResponse { data: saved }))
}

/// POST /api/v1/commissions/{id}/progress
///
/// The artist uploads a work-in-progress update for client review.
pub async fn upload_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UploadProgress>,
) -> AppResult<impl IntoResponse> {
    let commission = load_commission(&state.pool, id).await?;
    let transition = lifecycle::upload_progress(&commission, auth.user_id, input, Utc::now())?;
    let saved = persist(&state, auth.user_id, transition).await?;

    tracing::info!(
        commission_id = saved.id,
        artist_id = auth.user_id,
        entries = saved.work_in_progress.len(),
        "progress uploaded"
    );

    Ok(Json(DataResponse { data: saved }))
}

/// POST /api/v1/commissions/{id}/progress/{index}/review
///
/// The client approves or requests changes on one progress entry.
pub async fn review_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, index)): Path<(DbId, usize)>,
    Json(input): Json<ReviewProgress>,
) -> AppResult<impl IntoResponse> {
    let commission = load_commission(&state.pool, id).await?;
    let transition =
        lifecycle::review_progress(&commission, auth.user_id, index, input, Utc::now())?;
    let saved = persist(&state, auth.user_id, transition).await?;

    tracing::info!(
        commission_id = saved.id,
        client_id = auth.user_id,
        entry_index = index,
        "progress reviewed"
    );

    Ok(Json(DataResponse { data: saved }))
}

/// POST /api/v1/commissions/{id}/milestones/{index}/complete
///
/// The artist marks one milestone from the quote as done.
pub async fn complete_milestone(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, index)): Path<(DbId, usize)>,
) -> AppResult<impl IntoResponse> {
    let commission = load_commission(&state.pool, id).await?;
    let transition = lifecycle::complete_milestone(&commission, auth.user_id, index, Utc::now())?;
    let saved = persist(&state, auth.user_id, transition).await?;

    tracing::info!(
        commission_id = saved.id,
        artist_id = auth.user_id,
        milestone_index = index,
        "milestone completed"
    );

    Ok(Json(DataResponse { data: saved }))
}

/// PUT /api/v1/commissions/{id}/status
///
/// Move the commission along the lifecycle graph. Rejected when the
/// target is not reachable from the current status.
pub async fn update_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStatus>,
) -> AppResult<impl IntoResponse> {
    let commission = load_commission(&state.pool, id).await?;
    let previous = commission.status;
    let transition = lifecycle::update_status(&commission, auth.user_id, input, Utc::now())?;
    let saved = persist(&state, auth.user_id, transition).await?;

    tracing::info!(
        commission_id = saved.id,
        user_id = auth.user_id,
        from = %previous,
        to = %saved.status,
        "status updated"
    );

    Ok(Json(DataResponse { data: saved }))
}

/// POST /api/v1/commissions/{id}/reviews
///
/// Leave a rating once the work is completed or delivered. Each side
/// gets one review.
pub async fn add_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SubmitReview>,
) -> AppResult<impl IntoResponse> {
    let commission = load_commission(&state.pool, id).await?;
    let transition = lifecycle::add_review(&commission, auth.user_id, input, Utc::now())?;
    let saved = persist(&state, auth.user_id, transition).await?;

    tracing::info!(
        commission_id = saved.id,
        user_id = auth.user_id,
        "review added"
    );

    Ok(Json(DataResponse { data: saved }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_commission(pool: &DbPool, id: DbId) -> Result<Commission, AppError> {
    let commission = CommissionRepo::find_by_id(pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Commission",
            id,
        })?;
    Ok(commission)
}

/// Persist the transitioned aggregate, then publish its notifications.
/// Publishing happens after the write so consumers never see an event
/// for state that failed to commit.
async fn persist(
    state: &AppState,
    actor_id: DbId,
    transition: Transition,
) -> Result<Commission, AppError> {
    let saved = CommissionRepo::save(&state.pool, &transition.commission).await?;
    publish_notifications(state, &saved, actor_id, &transition.notifications);
    Ok(saved)
}

fn publish_notifications(
    state: &AppState,
    commission: &Commission,
    actor_id: DbId,
    notifications: &[NotificationIntent],
) {
    for intent in notifications {
        let event = PlatformEvent::new(intent.kind.event_type())
            .with_source("commission", commission.id)
            .with_actor(actor_id)
            .with_recipient(intent.recipient_id)
            .with_payload(json!({
                "title": commission.title,
                "status": commission.status.as_str(),
                "summary": intent.kind.summary(),
            }));
        state.event_bus.publish(event);
    }
}

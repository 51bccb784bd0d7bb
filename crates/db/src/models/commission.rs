//! Row model for the `commissions` table and the row <-> domain mapping.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use atelier_core::commission::model::{
    Budget, Commission, CommunicationEntry, Milestone, PaymentSchedule, ProgressEntry,
    Requirements, Review, Timeline,
};
use atelier_core::commission::CommissionStatus;
use atelier_core::types::{DbId, Timestamp};

use crate::error::DbError;

/// Raw commission row. JSONB columns come back as `serde_json::Value` and
/// are decoded into domain types by [`CommissionRow::into_domain`].
#[derive(Debug, Clone, FromRow)]
pub struct CommissionRow {
    pub id: DbId,
    pub client_id: DbId,
    pub artist_id: DbId,
    pub title: String,
    pub description: String,
    pub requirements: serde_json::Value,
    pub budget_min: Decimal,
    pub budget_max: Decimal,
    pub proposed_price: Option<Decimal>,
    pub agreed_price: Option<Decimal>,
    pub status: String,
    pub timeline: serde_json::Value,
    pub milestones: serde_json::Value,
    pub communication: serde_json::Value,
    pub work_in_progress: serde_json::Value,
    pub payment: Option<serde_json::Value>,
    pub client_review: Option<serde_json::Value>,
    pub artist_review: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CommissionRow {
    /// Decode the row into the domain aggregate. A decode failure means
    /// the stored document drifted from the schema and surfaces as
    /// [`DbError::Corrupt`].
    pub fn into_domain(self) -> Result<Commission, DbError> {
        let status = CommissionStatus::parse(&self.status).map_err(|_| {
            DbError::Corrupt(format!(
                "commission {} has unknown status '{}'",
                self.id, self.status
            ))
        })?;
        Ok(Commission {
            id: self.id,
            client_id: self.client_id,
            artist_id: self.artist_id,
            title: self.title,
            description: self.description,
            requirements: decode::<Requirements>(self.id, "requirements", self.requirements)?,
            budget: Budget {
                min: self.budget_min,
                max: self.budget_max,
            },
            proposed_price: self.proposed_price,
            agreed_price: self.agreed_price,
            status,
            timeline: decode::<Timeline>(self.id, "timeline", self.timeline)?,
            milestones: decode::<Vec<Milestone>>(self.id, "milestones", self.milestones)?,
            communication: decode::<Vec<CommunicationEntry>>(
                self.id,
                "communication",
                self.communication,
            )?,
            work_in_progress: decode::<Vec<ProgressEntry>>(
                self.id,
                "work_in_progress",
                self.work_in_progress,
            )?,
            payment: decode_opt::<PaymentSchedule>(self.id, "payment", self.payment)?,
            client_review: decode_opt::<Review>(self.id, "client_review", self.client_review)?,
            artist_review: decode_opt::<Review>(self.id, "artist_review", self.artist_review)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn decode<T: DeserializeOwned>(
    id: DbId,
    field: &'static str,
    value: serde_json::Value,
) -> Result<T, DbError> {
    serde_json::from_value(value)
        .map_err(|e| DbError::Corrupt(format!("commission {id}: invalid {field} document: {e}")))
}

fn decode_opt<T: DeserializeOwned>(
    id: DbId,
    field: &'static str,
    value: Option<serde_json::Value>,
) -> Result<Option<T>, DbError> {
    value.map(|v| decode(id, field, v)).transpose()
}

/// Serialize a domain value for a JSONB bind.
pub(crate) fn to_json<T: Serialize>(field: &'static str, value: &T) -> Result<serde_json::Value, DbError> {
    serde_json::to_value(value)
        .map_err(|e| DbError::Corrupt(format!("cannot encode {field} document: {e}")))
}

/// Listing projection: the scalar columns only, cheap enough for pages of
/// results because none of the JSONB documents are decoded.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommissionSummary {
    pub id: DbId,
    pub client_id: DbId,
    pub artist_id: DbId,
    pub title: String,
    pub status: String,
    pub budget_min: Decimal,
    pub budget_max: Decimal,
    pub proposed_price: Option<Decimal>,
    pub agreed_price: Option<Decimal>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Which side of a commission a listing should match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    Client,
    Artist,
}

/// One `GROUP BY status` row of the per-user stats projection.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusBreakdown {
    pub status: String,
    pub count: i64,
    /// Rows in this status that carry an agreed price.
    pub agreed_count: i64,
    /// Sum of agreed prices in this status (0 when none are agreed).
    pub total_value: Decimal,
}

/// Aggregated per-user commission stats.
#[derive(Debug, Clone, Serialize)]
pub struct CommissionStats {
    pub by_status: Vec<StatusBreakdown>,
    pub total_commissions: i64,
    pub total_agreed_value: Decimal,
    /// Mean agreed price across priced commissions; `None` when no
    /// commission has an agreed price yet.
    pub average_agreed_value: Option<Decimal>,
}

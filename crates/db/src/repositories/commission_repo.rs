//! Repository for the `commissions` table.
//!
//! Reads decode the JSONB documents into the domain aggregate; writes go
//! the other way. `save` replaces every mutable column from the in-memory
//! value in one statement, so concurrent operations on the same
//! commission resolve last-writer-wins at whole-operation granularity
//! with no torn records.

use sqlx::PgPool;

use atelier_core::commission::model::{Commission, NewCommission};
use atelier_core::commission::CommissionStatus;
use atelier_core::types::DbId;

use crate::error::DbError;
use crate::models::commission::{
    to_json, CommissionRow, CommissionStats, CommissionSummary, Party, StatusBreakdown,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, client_id, artist_id, title, description, requirements, \
    budget_min, budget_max, proposed_price, agreed_price, status, \
    timeline, milestones, communication, work_in_progress, payment, \
    client_review, artist_review, created_at, updated_at";

/// Scalar columns only, for listings.
const SUMMARY_COLUMNS: &str = "\
    id, client_id, artist_id, title, status, budget_min, budget_max, \
    proposed_price, agreed_price, created_at, updated_at";

pub struct CommissionRepo;

impl CommissionRepo {
    /// Insert a freshly requested commission, returning the stored
    /// aggregate with its assigned id. The log columns start at their
    /// schema defaults (empty documents).
    pub async fn insert(pool: &PgPool, new: &NewCommission) -> Result<Commission, DbError> {
        let query = format!(
            "INSERT INTO commissions \
                (client_id, artist_id, title, description, requirements, \
                 budget_min, budget_max, status, timeline) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, CommissionRow>(&query)
            .bind(new.client_id)
            .bind(new.artist_id)
            .bind(&new.title)
            .bind(&new.description)
            .bind(to_json("requirements", &new.requirements)?)
            .bind(new.budget.min)
            .bind(new.budget.max)
            .bind(new.status.as_str())
            .bind(to_json("timeline", &new.timeline)?)
            .fetch_one(pool)
            .await?;
        row.into_domain()
    }

    /// Load one commission with its full history.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Commission>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM commissions WHERE id = $1");
        let row = sqlx::query_as::<_, CommissionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        row.map(CommissionRow::into_domain).transpose()
    }

    /// Replace the stored record with `commission`. The parties and
    /// creation time are immutable; everything else, including
    /// `updated_at`, is written from the in-memory value. Fails with a
    /// row-not-found error if the commission vanished underneath us.
    pub async fn save(pool: &PgPool, commission: &Commission) -> Result<Commission, DbError> {
        let query = format!(
            "UPDATE commissions SET \
                title = $2, description = $3, requirements = $4, \
                budget_min = $5, budget_max = $6, proposed_price = $7, \
                agreed_price = $8, status = $9, timeline = $10, \
                milestones = $11, communication = $12, work_in_progress = $13, \
                payment = $14, client_review = $15, artist_review = $16, \
                updated_at = $17 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, CommissionRow>(&query)
            .bind(commission.id)
            .bind(&commission.title)
            .bind(&commission.description)
            .bind(to_json("requirements", &commission.requirements)?)
            .bind(commission.budget.min)
            .bind(commission.budget.max)
            .bind(commission.proposed_price)
            .bind(commission.agreed_price)
            .bind(commission.status.as_str())
            .bind(to_json("timeline", &commission.timeline)?)
            .bind(to_json("milestones", &commission.milestones)?)
            .bind(to_json("communication", &commission.communication)?)
            .bind(to_json("work_in_progress", &commission.work_in_progress)?)
            .bind(
                commission
                    .payment
                    .as_ref()
                    .map(|p| to_json("payment", p))
                    .transpose()?,
            )
            .bind(
                commission
                    .client_review
                    .as_ref()
                    .map(|r| to_json("client_review", r))
                    .transpose()?,
            )
            .bind(
                commission
                    .artist_review
                    .as_ref()
                    .map(|r| to_json("artist_review", r))
                    .transpose()?,
            )
            .bind(commission.updated_at)
            .fetch_one(pool)
            .await?;
        row.into_domain()
    }

    /// List a user's commissions newest-first, optionally narrowed to one
    /// status and/or one side of the table.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        status: Option<CommissionStatus>,
        party: Option<Party>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CommissionSummary>, DbError> {
        let party_condition = match party {
            Some(Party::Client) => "client_id = $1",
            Some(Party::Artist) => "artist_id = $1",
            None => "(client_id = $1 OR artist_id = $1)",
        };
        let mut conditions = vec![party_condition.to_string()];
        let mut param_idx: usize = 2;

        if status.is_some() {
            conditions.push(format!("status = ${param_idx}"));
            param_idx += 1;
        }

        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM commissions \
             WHERE {} \
             ORDER BY created_at DESC \
             LIMIT ${param_idx} OFFSET ${}",
            conditions.join(" AND "),
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, CommissionSummary>(&query).bind(user_id);
        if let Some(s) = status {
            q = q.bind(s.as_str());
        }
        q = q.bind(limit).bind(offset);

        let rows = q.fetch_all(pool).await?;
        Ok(rows)
    }

    /// Per-status stats for commissions the user participates in: row
    /// counts, agreed totals, and the mean agreed price overall.
    pub async fn stats_for_user(pool: &PgPool, user_id: DbId) -> Result<CommissionStats, DbError> {
        let by_status: Vec<StatusBreakdown> = sqlx::query_as(
            "SELECT status, \
                    COUNT(*) AS count, \
                    COUNT(agreed_price) AS agreed_count, \
                    COALESCE(SUM(agreed_price), 0) AS total_value \
             FROM commissions \
             WHERE client_id = $1 OR artist_id = $1 \
             GROUP BY status \
             ORDER BY status",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        let mut total_commissions = 0;
        let mut agreed_count = 0;
        let mut total_agreed_value = rust_decimal::Decimal::ZERO;
        for row in &by_status {
            total_commissions += row.count;
            agreed_count += row.agreed_count;
            total_agreed_value += row.total_value;
        }
        let average_agreed_value = (agreed_count > 0)
            .then(|| (total_agreed_value / rust_decimal::Decimal::from(agreed_count)).round_dp(2));

        Ok(CommissionStats {
            by_status,
            total_commissions,
            total_agreed_value,
            average_agreed_value,
        })
    }
}

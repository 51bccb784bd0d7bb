//! Commission aggregate and its embedded value types.
//!
//! The nested collections (requirements, timeline, milestones, logs,
//! payment, reviews) are stored as JSONB columns, so every type here
//! derives `Serialize`/`Deserialize` and the serde shape IS the storage
//! shape. Renaming a field is a data migration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

use super::status::CommissionStatus;

/// Client-stated price range for the initial request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub min: Decimal,
    pub max: Decimal,
}

/// What the client wants made. Free-form apart from the deadline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    pub style: Option<String>,
    pub medium: Option<String>,
    pub dimensions: Option<String>,
    #[serde(default)]
    pub reference_images: Vec<String>,
    pub deadline: Option<Timestamp>,
}

/// Scheduling data, filled in progressively: the estimate at request time,
/// start and expected dates at acceptance, the actual date at completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub estimated_days: Option<i32>,
    pub start_date: Option<Timestamp>,
    pub expected_completion: Option<Timestamp>,
    pub actual_completion: Option<Timestamp>,
}

/// A named deliverable checkpoint carrying a share of the agreed price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Timestamp>,
    /// Share of the agreed price, in whole percent. All milestones of a
    /// quote sum to exactly 100.
    pub payment_percentage: Decimal,
    #[serde(default)]
    pub completed: bool,
    pub completed_date: Option<Timestamp>,
}

/// Discriminator for communication log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Message,
    Quote,
    RevisionRequest,
    Approval,
    Delivery,
    /// System-generated audit entry; never accepted from callers.
    StatusChange,
}

/// One entry in the append-only communication log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationEntry {
    pub sender_id: DbId,
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<String>,
    pub message_type: MessageType,
    pub sent_at: Timestamp,
}

/// An artist-submitted work-in-progress update. `approved` stays `None`
/// until the client reviews it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub title: String,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub approved: Option<bool>,
    pub feedback: Option<String>,
    pub uploaded_at: Timestamp,
    pub reviewed_at: Option<Timestamp>,
}

/// One scheduled installment of the agreed price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub amount: Decimal,
    pub due_date: Option<Timestamp>,
    #[serde(default)]
    pub paid: bool,
    pub paid_date: Option<Timestamp>,
    /// Reference assigned by the external payment processor once captured.
    pub payment_reference: Option<String>,
}

/// Payment schedule, derived exactly once when a quote is accepted.
/// `paid_amount` moves only when the external processor confirms a charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub installments: Vec<Installment>,
}

/// A one-time rating left by one party about the other after completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub rating: i32,
    pub comment: Option<String>,
    pub reviewed_at: Timestamp,
}

/// The commission aggregate. One row in `commissions`; lifecycle
/// operations take it by reference and return an updated copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commission {
    pub id: DbId,
    pub client_id: DbId,
    pub artist_id: DbId,
    pub title: String,
    pub description: String,
    pub requirements: Requirements,
    pub budget: Budget,
    pub proposed_price: Option<Decimal>,
    pub agreed_price: Option<Decimal>,
    pub status: CommissionStatus,
    pub timeline: Timeline,
    pub milestones: Vec<Milestone>,
    pub communication: Vec<CommunicationEntry>,
    pub work_in_progress: Vec<ProgressEntry>,
    pub payment: Option<PaymentSchedule>,
    pub client_review: Option<Review>,
    pub artist_review: Option<Review>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Commission {
    /// Whether `user_id` is the client or the artist on this commission.
    pub fn is_participant(&self, user_id: DbId) -> bool {
        user_id == self.client_id || user_id == self.artist_id
    }

    /// The other party, from `user_id`'s point of view. Callers must have
    /// checked [`is_participant`](Self::is_participant) first; for a
    /// non-participant this returns the client.
    pub fn counterparty_of(&self, user_id: DbId) -> DbId {
        if user_id == self.client_id {
            self.artist_id
        } else {
            self.client_id
        }
    }
}

/// A validated commission that has not been persisted yet. The repository
/// inserts it and returns the full [`Commission`] with its assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCommission {
    pub client_id: DbId,
    pub artist_id: DbId,
    pub title: String,
    pub description: String,
    pub requirements: Requirements,
    pub budget: Budget,
    pub status: CommissionStatus,
    pub timeline: Timeline,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_checks() {
        let c = crate::commission::testing::sample_commission();
        assert!(c.is_participant(c.client_id));
        assert!(c.is_participant(c.artist_id));
        assert!(!c.is_participant(999));
        assert_eq!(c.counterparty_of(c.client_id), c.artist_id);
        assert_eq!(c.counterparty_of(c.artist_id), c.client_id);
    }

    #[test]
    fn message_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&MessageType::RevisionRequest).unwrap(),
            "\"revision_request\""
        );
        assert_eq!(
            serde_json::to_string(&MessageType::StatusChange).unwrap(),
            "\"status_change\""
        );
    }

    #[test]
    fn progress_entry_defaults_to_unreviewed() {
        let json = r#"{
            "title": "Lines",
            "description": null,
            "images": ["https://cdn.example/wip-1.png"],
            "approved": null,
            "feedback": null,
            "uploaded_at": "2026-03-01T12:00:00Z",
            "reviewed_at": null
        }"#;
        let entry: ProgressEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.approved, None);
        assert_eq!(entry.reviewed_at, None);
    }
}

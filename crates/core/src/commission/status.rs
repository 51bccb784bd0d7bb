//! Commission statuses and the lifecycle transition graph.
//!
//! Statuses are serialized as `snake_case` strings, both over the wire and
//! in the `commissions.status` column.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
    /// Newly requested by a client, not yet looked at by the artist.
    Pending,
    /// Artist is considering the request.
    Reviewing,
    /// Artist has submitted a quote and is waiting on the client.
    Quoted,
    /// Client pushed back on the quote; parties are haggling.
    Negotiating,
    /// Client accepted the quote; payment schedule exists from here on.
    Accepted,
    /// Artist is working.
    InProgress,
    /// Work handed over for client review.
    Review,
    /// Client requested changes; artist will resume work.
    Revision,
    /// Client signed off on the finished work.
    Completed,
    /// Final deliverables handed over.
    Delivered,
    /// Abandoned by either party before delivery.
    Cancelled,
    /// Declined outright.
    Rejected,
}

impl CommissionStatus {
    pub const ALL: &'static [CommissionStatus] = &[
        CommissionStatus::Pending,
        CommissionStatus::Reviewing,
        CommissionStatus::Quoted,
        CommissionStatus::Negotiating,
        CommissionStatus::Accepted,
        CommissionStatus::InProgress,
        CommissionStatus::Review,
        CommissionStatus::Revision,
        CommissionStatus::Completed,
        CommissionStatus::Delivered,
        CommissionStatus::Cancelled,
        CommissionStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CommissionStatus::Pending => "pending",
            CommissionStatus::Reviewing => "reviewing",
            CommissionStatus::Quoted => "quoted",
            CommissionStatus::Negotiating => "negotiating",
            CommissionStatus::Accepted => "accepted",
            CommissionStatus::InProgress => "in_progress",
            CommissionStatus::Review => "review",
            CommissionStatus::Revision => "revision",
            CommissionStatus::Completed => "completed",
            CommissionStatus::Delivered => "delivered",
            CommissionStatus::Cancelled => "cancelled",
            CommissionStatus::Rejected => "rejected",
        }
    }

    /// Parse a stored status string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        CommissionStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Invalid commission status '{s}'")))
    }

    /// Terminal statuses freeze the lifecycle: no further status changes,
    /// though messages and reviews may still be appended where the
    /// operation allows it.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CommissionStatus::Delivered | CommissionStatus::Cancelled | CommissionStatus::Rejected
        )
    }
}

impl std::fmt::Display for CommissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// Returns the statuses reachable from `from` via a plain status update.
///
/// Transition rules:
/// - `pending`     -> `reviewing`, `cancelled`, `rejected`
/// - `reviewing`   -> `cancelled`, `rejected`
/// - `quoted`      -> `negotiating`, `cancelled`, `rejected`
/// - `negotiating` -> `cancelled`, `rejected`
/// - `accepted`    -> `in_progress`, `cancelled`, `rejected`
/// - `in_progress` -> `review`, `cancelled`, `rejected`
/// - `review`      -> `revision`, `completed`, `cancelled`, `rejected`
/// - `revision`    -> `in_progress`, `cancelled`, `rejected`
/// - `completed`   -> `delivered`
/// - terminal statuses have no outgoing transitions
///
/// `quoted` and `accepted` are deliberately absent as targets: they are
/// entered through the quote submission and quote acceptance operations,
/// which also write the price and payment fields a bare status change
/// would leave dangling.
pub fn valid_transitions(from: CommissionStatus) -> &'static [CommissionStatus] {
    use CommissionStatus::*;
    match from {
        Pending => &[Reviewing, Cancelled, Rejected],
        Reviewing => &[Cancelled, Rejected],
        Quoted => &[Negotiating, Cancelled, Rejected],
        Negotiating => &[Cancelled, Rejected],
        Accepted => &[InProgress, Cancelled, Rejected],
        InProgress => &[Review, Cancelled, Rejected],
        Review => &[Revision, Completed, Cancelled, Rejected],
        Revision => &[InProgress, Cancelled, Rejected],
        Completed => &[Delivered],
        Delivered | Cancelled | Rejected => &[],
    }
}

pub fn can_transition(from: CommissionStatus, to: CommissionStatus) -> bool {
    valid_transitions(from).contains(&to)
}

/// Validate that a status transition from `current` to `next` is allowed.
pub fn validate_transition(
    current: CommissionStatus,
    next: CommissionStatus,
) -> Result<(), CoreError> {
    if can_transition(current, next) {
        Ok(())
    } else {
        let allowed: Vec<&str> = valid_transitions(current)
            .iter()
            .map(|s| s.as_str())
            .collect();
        Err(CoreError::Validation(format!(
            "Cannot transition commission from '{current}' to '{next}'. Allowed transitions: {allowed:?}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use CommissionStatus::*;

    #[test]
    fn status_strings_round_trip() {
        for status in CommissionStatus::ALL {
            assert_eq!(CommissionStatus::parse(status.as_str()).unwrap(), *status);
        }
    }

    #[test]
    fn unknown_status_fails_to_parse() {
        assert!(CommissionStatus::parse("unknown").is_err());
        assert!(CommissionStatus::parse("").is_err());
        assert!(CommissionStatus::parse("IN_PROGRESS").is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(serde_json::to_string(&InProgress).unwrap(), "\"in_progress\"");
        let back: CommissionStatus = serde_json::from_str("\"revision\"").unwrap();
        assert_eq!(back, Revision);
    }

    #[test]
    fn pending_moves_to_reviewing() {
        assert!(validate_transition(Pending, Reviewing).is_ok());
        assert!(validate_transition(Pending, InProgress).is_err());
        assert!(validate_transition(Pending, Delivered).is_err());
    }

    #[test]
    fn quoted_and_accepted_are_not_plain_targets() {
        assert!(validate_transition(Reviewing, Quoted).is_err());
        assert!(validate_transition(Negotiating, Accepted).is_err());
        assert!(validate_transition(Quoted, Accepted).is_err());
    }

    #[test]
    fn every_non_terminal_status_can_cancel() {
        for status in CommissionStatus::ALL {
            if status.is_terminal() || *status == Completed {
                continue;
            }
            assert!(
                can_transition(*status, Cancelled),
                "'{status}' should allow cancellation"
            );
        }
    }

    #[test]
    fn work_loop_review_revision() {
        assert!(validate_transition(InProgress, Review).is_ok());
        assert!(validate_transition(Review, Revision).is_ok());
        assert!(validate_transition(Revision, InProgress).is_ok());
        assert!(validate_transition(Review, Completed).is_ok());
    }

    #[test]
    fn completed_only_delivers() {
        assert_eq!(valid_transitions(Completed), [Delivered]);
        assert!(validate_transition(Completed, Cancelled).is_err());
    }

    #[test]
    fn terminal_statuses_are_frozen() {
        for status in [Delivered, Cancelled, Rejected] {
            assert!(status.is_terminal());
            assert!(valid_transitions(status).is_empty());
        }
        assert!(!Completed.is_terminal());
    }
}

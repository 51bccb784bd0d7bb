//! Commission lifecycle operations.
//!
//! Every operation is a pure function: it takes the current [`Commission`]
//! value, the caller's identity, and a typed request, and returns a
//! [`Transition`] holding the updated commission plus the notifications to
//! dispatch once the update is persisted. Nothing here touches the
//! database or the event bus, which keeps the whole rule set unit
//! testable.
//!
//! Authorization is part of the rules: each operation checks the caller
//! against the commission's parties and rejects with
//! [`CoreError::Forbidden`] before validating anything else.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::CoreError;
use crate::roles;
use crate::types::{DbId, Timestamp};

use super::model::{
    Budget, Commission, CommunicationEntry, MessageType, Milestone, NewCommission, ProgressEntry,
    Requirements, Review, Timeline,
};
use super::payment;
use super::status::{self, CommissionStatus};
use super::validation;

/// Statuses in which the artist may submit (or replace) a quote.
const QUOTABLE: &[CommissionStatus] = &[
    CommissionStatus::Pending,
    CommissionStatus::Reviewing,
    CommissionStatus::Quoted,
    CommissionStatus::Negotiating,
];

/// Statuses in which the client may accept the standing quote.
const ACCEPTABLE: &[CommissionStatus] =
    &[CommissionStatus::Quoted, CommissionStatus::Negotiating];

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Result of a successful lifecycle operation: the next commission value
/// and the notifications the caller should fan out after persisting it.
#[derive(Debug, Clone)]
pub struct Transition {
    pub commission: Commission,
    pub notifications: Vec<NotificationIntent>,
}

/// A notification owed to one user as a consequence of an operation.
/// Dispatch (event bus, email) happens outside the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationIntent {
    pub recipient_id: DbId,
    pub kind: NotificationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    CommissionRequested,
    MessageReceived,
    QuoteSubmitted,
    QuoteAccepted,
    ProgressUploaded,
    ProgressReviewed,
    MilestoneCompleted,
    StatusChanged,
    ReviewReceived,
}

impl NotificationKind {
    /// Dot-separated event name published on the platform event bus.
    pub fn event_type(self) -> &'static str {
        match self {
            NotificationKind::CommissionRequested => "commission.requested",
            NotificationKind::MessageReceived => "commission.message",
            NotificationKind::QuoteSubmitted => "commission.quoted",
            NotificationKind::QuoteAccepted => "commission.accepted",
            NotificationKind::ProgressUploaded => "commission.progress",
            NotificationKind::ProgressReviewed => "commission.progress_reviewed",
            NotificationKind::MilestoneCompleted => "commission.milestone_completed",
            NotificationKind::StatusChanged => "commission.status_changed",
            NotificationKind::ReviewReceived => "commission.review",
        }
    }

    /// One-line human description, used as the email subject.
    pub fn summary(self) -> &'static str {
        match self {
            NotificationKind::CommissionRequested => "New commission request",
            NotificationKind::MessageReceived => "New message on your commission",
            NotificationKind::QuoteSubmitted => "You received a quote",
            NotificationKind::QuoteAccepted => "Your quote was accepted",
            NotificationKind::ProgressUploaded => "New progress update",
            NotificationKind::ProgressReviewed => "Your progress update was reviewed",
            NotificationKind::MilestoneCompleted => "Milestone completed",
            NotificationKind::StatusChanged => "Commission status changed",
            NotificationKind::ReviewReceived => "You received a review",
        }
    }
}

fn notify(recipient_id: DbId, kind: NotificationKind) -> Vec<NotificationIntent> {
    vec![NotificationIntent { recipient_id, kind }]
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// The slice of a user row the lifecycle rules need. Resolved from the
/// user directory by the caller.
#[derive(Debug, Clone)]
pub struct UserRef {
    pub id: DbId,
    pub role: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestCommission {
    pub artist_id: DbId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Requirements,
    pub budget: Budget,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessage {
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<String>,
    /// Defaults to a plain `message`. `status_change` is system-reserved.
    pub message_type: Option<MessageType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MilestoneInput {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Timestamp>,
    pub payment_percentage: Decimal,
}

impl MilestoneInput {
    fn into_milestone(self) -> Milestone {
        Milestone {
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            payment_percentage: self.payment_percentage,
            completed: false,
            completed_date: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitQuote {
    pub proposed_price: Decimal,
    pub estimated_days: Option<i32>,
    #[serde(default)]
    pub milestones: Vec<MilestoneInput>,
    /// Free-form terms, recorded verbatim in the communication log.
    pub terms: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadProgress {
    pub title: String,
    pub description: Option<String>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewProgress {
    pub approved: bool,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatus {
    pub status: CommissionStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitReview {
    pub rating: i32,
    pub comment: Option<String>,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Open a new commission request from `client_id` to `artist`.
///
/// The target must resolve to an active artist account; a deactivated
/// user or one without the artist role reports the artist as not found.
/// The returned [`NewCommission`] starts in `pending` with an empty
/// history. When the requirements carry a deadline, the timeline gets an
/// estimated day count derived from it (rounded up to whole days).
pub fn request_commission(
    client_id: DbId,
    artist: &UserRef,
    input: RequestCommission,
    now: Timestamp,
) -> Result<(NewCommission, Vec<NotificationIntent>), CoreError> {
    if !roles::is_artist(&artist.role) || !artist.is_active {
        return Err(CoreError::NotFound {
            entity: "Artist",
            id: artist.id,
        });
    }
    if artist.id == client_id {
        return Err(CoreError::Validation(
            "You cannot commission yourself".into(),
        ));
    }
    validation::validate_title(&input.title)?;
    validation::validate_description(&input.description)?;
    validation::validate_budget(&input.budget)?;

    let estimated_days = match input.requirements.deadline {
        Some(deadline) => Some(days_until(deadline, now)?),
        None => None,
    };

    let new = NewCommission {
        client_id,
        artist_id: artist.id,
        title: input.title,
        description: input.description,
        requirements: input.requirements,
        budget: input.budget,
        status: CommissionStatus::Pending,
        timeline: Timeline {
            estimated_days,
            ..Timeline::default()
        },
    };
    Ok((new, notify(artist.id, NotificationKind::CommissionRequested)))
}

fn days_until(deadline: Timestamp, now: Timestamp) -> Result<i32, CoreError> {
    let delta = deadline - now;
    if delta <= chrono::Duration::zero() {
        return Err(CoreError::Validation(
            "Requirement deadline must be in the future".into(),
        ));
    }
    let days = (delta.num_seconds() + 86_399) / 86_400;
    i32::try_from(days)
        .map_err(|_| CoreError::Validation("Requirement deadline is too far in the future".into()))
}

/// Append a message to the communication log.
///
/// Works in every status, including terminal ones; the conversation
/// outlives the lifecycle.
pub fn add_message(
    commission: &Commission,
    sender_id: DbId,
    input: SendMessage,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    if !commission.is_participant(sender_id) {
        return Err(CoreError::Forbidden(
            "Only the commission's client or artist may post messages".into(),
        ));
    }
    let message_type = input.message_type.unwrap_or(MessageType::Message);
    if message_type == MessageType::StatusChange {
        return Err(CoreError::Validation(
            "Message type 'status_change' is reserved for system entries".into(),
        ));
    }
    validation::validate_message_text(&input.text)?;
    validation::validate_attachments(&input.attachments)?;

    let mut next = commission.clone();
    next.communication.push(CommunicationEntry {
        sender_id,
        text: input.text,
        attachments: input.attachments,
        message_type,
        sent_at: now,
    });
    next.updated_at = now;

    Ok(Transition {
        notifications: notify(
            commission.counterparty_of(sender_id),
            NotificationKind::MessageReceived,
        ),
        commission: next,
    })
}

/// Submit or replace a quote: price, optional day estimate, and an
/// optional milestone plan whose percentages must sum to 100.
///
/// Moves the commission to `quoted` and records the quote (terms or a
/// generated summary) in the communication log.
pub fn submit_quote(
    commission: &Commission,
    caller_id: DbId,
    input: SubmitQuote,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    if caller_id != commission.artist_id {
        return Err(CoreError::Forbidden(
            "Only the commissioned artist may submit a quote".into(),
        ));
    }
    if !QUOTABLE.contains(&commission.status) {
        return Err(CoreError::Validation(format!(
            "Cannot submit a quote for a commission in status '{}'",
            commission.status
        )));
    }
    validation::validate_price(input.proposed_price)?;
    if let Some(days) = input.estimated_days {
        if days <= 0 {
            return Err(CoreError::Validation(format!(
                "Estimated days must be positive (got {days})"
            )));
        }
    }
    let milestones: Vec<Milestone> = input
        .milestones
        .into_iter()
        .map(MilestoneInput::into_milestone)
        .collect();
    validation::validate_milestones(&milestones)?;

    let mut next = commission.clone();
    next.proposed_price = Some(input.proposed_price);
    next.milestones = milestones;
    if input.estimated_days.is_some() {
        next.timeline.estimated_days = input.estimated_days;
    }
    next.status = CommissionStatus::Quoted;
    let text = input
        .terms
        .unwrap_or_else(|| format!("Quoted {}", input.proposed_price));
    next.communication.push(CommunicationEntry {
        sender_id: caller_id,
        text,
        attachments: Vec::new(),
        message_type: MessageType::Quote,
        sent_at: now,
    });
    next.updated_at = now;

    Ok(Transition {
        notifications: notify(commission.client_id, NotificationKind::QuoteSubmitted),
        commission: next,
    })
}

/// Accept the standing quote.
///
/// Fixes the agreed price, starts the timeline, derives the payment
/// schedule, and moves the commission to `accepted`. Acceptance is
/// one-shot: once the commission has left `quoted`/`negotiating` this
/// operation rejects, so the schedule is never derived twice.
pub fn accept_quote(
    commission: &Commission,
    caller_id: DbId,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    if caller_id != commission.client_id {
        return Err(CoreError::Forbidden(
            "Only the commissioning client may accept a quote".into(),
        ));
    }
    if !ACCEPTABLE.contains(&commission.status) {
        return Err(CoreError::Validation(format!(
            "Cannot accept a quote for a commission in status '{}'",
            commission.status
        )));
    }
    let price = commission.proposed_price.ok_or_else(|| {
        CoreError::Validation("No quote has been submitted for this commission".into())
    })?;

    let mut next = commission.clone();
    next.agreed_price = Some(price);
    next.status = CommissionStatus::Accepted;
    next.timeline.start_date = Some(now);
    if let Some(days) = next.timeline.estimated_days {
        next.timeline.expected_completion = Some(now + chrono::Duration::days(i64::from(days)));
    }
    // Expected completion must be settled before derivation so the default
    // schedule can anchor its final installment to it.
    next.payment = Some(payment::derive_schedule(
        price,
        &next.milestones,
        &next.timeline,
        now,
    ));
    next.communication.push(CommunicationEntry {
        sender_id: caller_id,
        text: format!("Quote accepted at {price}"),
        attachments: Vec::new(),
        message_type: MessageType::Approval,
        sent_at: now,
    });
    next.updated_at = now;

    Ok(Transition {
        notifications: notify(commission.artist_id, NotificationKind::QuoteAccepted),
        commission: next,
    })
}

/// Append a work-in-progress update. Does not change status; the artist
/// signals review readiness through a status update.
pub fn upload_progress(
    commission: &Commission,
    caller_id: DbId,
    input: UploadProgress,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    if caller_id != commission.artist_id {
        return Err(CoreError::Forbidden(
            "Only the commissioned artist may upload progress".into(),
        ));
    }
    if commission.status.is_terminal() {
        return Err(CoreError::Validation(format!(
            "Cannot upload progress to a commission in status '{}'",
            commission.status
        )));
    }
    validation::validate_title(&input.title)?;
    validation::validate_progress_images(&input.images)?;

    let mut next = commission.clone();
    next.work_in_progress.push(ProgressEntry {
        title: input.title,
        description: input.description,
        images: input.images,
        approved: None,
        feedback: None,
        uploaded_at: now,
        reviewed_at: None,
    });
    next.updated_at = now;

    Ok(Transition {
        notifications: notify(commission.client_id, NotificationKind::ProgressUploaded),
        commission: next,
    })
}

/// Record the client's verdict on one progress update and mirror it into
/// the communication log as an approval or revision request.
pub fn review_progress(
    commission: &Commission,
    caller_id: DbId,
    entry_index: usize,
    input: ReviewProgress,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    if caller_id != commission.client_id {
        return Err(CoreError::Forbidden(
            "Only the commissioning client may review progress".into(),
        ));
    }
    if entry_index >= commission.work_in_progress.len() {
        return Err(CoreError::NotFound {
            entity: "Progress update",
            id: entry_index as DbId,
        });
    }
    if let Some(feedback) = &input.feedback {
        validation::validate_message_text(feedback)?;
    }

    let mut next = commission.clone();
    let entry = &mut next.work_in_progress[entry_index];
    entry.approved = Some(input.approved);
    entry.feedback = input.feedback.clone();
    entry.reviewed_at = Some(now);

    let (message_type, default_text) = if input.approved {
        (MessageType::Approval, "Progress approved")
    } else {
        (MessageType::RevisionRequest, "Changes requested")
    };
    next.communication.push(CommunicationEntry {
        sender_id: caller_id,
        text: input.feedback.unwrap_or_else(|| default_text.into()),
        attachments: Vec::new(),
        message_type,
        sent_at: now,
    });
    next.updated_at = now;

    Ok(Transition {
        notifications: notify(commission.artist_id, NotificationKind::ProgressReviewed),
        commission: next,
    })
}

/// Mark one milestone finished. Payment state is untouched: installments
/// are settled by the payment processor, not by milestone bookkeeping.
pub fn complete_milestone(
    commission: &Commission,
    caller_id: DbId,
    milestone_index: usize,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    if caller_id != commission.artist_id {
        return Err(CoreError::Forbidden(
            "Only the commissioned artist may complete milestones".into(),
        ));
    }
    let Some(milestone) = commission.milestones.get(milestone_index) else {
        return Err(CoreError::NotFound {
            entity: "Milestone",
            id: milestone_index as DbId,
        });
    };
    if milestone.completed {
        return Err(CoreError::Validation(format!(
            "Milestone '{}' is already completed",
            milestone.title
        )));
    }

    let mut next = commission.clone();
    next.milestones[milestone_index].completed = true;
    next.milestones[milestone_index].completed_date = Some(now);
    next.updated_at = now;

    Ok(Transition {
        notifications: notify(commission.client_id, NotificationKind::MilestoneCompleted),
        commission: next,
    })
}

/// Move the commission along the transition graph.
///
/// Either party may drive the status; the graph itself is the guard.
/// Entering `completed` stamps the actual completion date, and every
/// change is logged as a system entry in the communication log.
pub fn update_status(
    commission: &Commission,
    actor_id: DbId,
    input: UpdateStatus,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    if !commission.is_participant(actor_id) {
        return Err(CoreError::Forbidden(
            "Only the commission's client or artist may change its status".into(),
        ));
    }
    status::validate_transition(commission.status, input.status)?;

    let mut next = commission.clone();
    next.status = input.status;
    if input.status == CommissionStatus::Completed {
        next.timeline.actual_completion = Some(now);
    }
    next.communication.push(CommunicationEntry {
        sender_id: actor_id,
        text: format!(
            "Status changed from '{}' to '{}'",
            commission.status, input.status
        ),
        attachments: Vec::new(),
        message_type: MessageType::StatusChange,
        sent_at: now,
    });
    next.updated_at = now;

    Ok(Transition {
        notifications: notify(
            commission.counterparty_of(actor_id),
            NotificationKind::StatusChanged,
        ),
        commission: next,
    })
}

/// Leave a one-time rating for the other party. Open from `completed`
/// onwards, including after delivery.
pub fn add_review(
    commission: &Commission,
    caller_id: DbId,
    input: SubmitReview,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    if !commission.is_participant(caller_id) {
        return Err(CoreError::Forbidden(
            "Only the commission's client or artist may leave a review".into(),
        ));
    }
    if !matches!(
        commission.status,
        CommissionStatus::Completed | CommissionStatus::Delivered
    ) {
        return Err(CoreError::Validation(format!(
            "Reviews can only be left once the commission is completed (status is '{}')",
            commission.status
        )));
    }
    validation::validate_rating(input.rating)?;

    let mut next = commission.clone();
    let slot = if caller_id == commission.client_id {
        &mut next.client_review
    } else {
        &mut next.artist_review
    };
    if slot.is_some() {
        let side = if caller_id == commission.client_id {
            "client"
        } else {
            "artist"
        };
        return Err(CoreError::Validation(format!(
            "A {side} review has already been submitted"
        )));
    }
    *slot = Some(Review {
        rating: input.rating,
        comment: input.comment,
        reviewed_at: now,
    });
    next.updated_at = now;

    Ok(Transition {
        notifications: notify(
            commission.counterparty_of(caller_id),
            NotificationKind::ReviewReceived,
        ),
        commission: next,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commission::testing::{
        commission_in, dec, sample_commission, ts, ARTIST_ID, CLIENT_ID,
    };
    use assert_matches::assert_matches;

    const OUTSIDER_ID: DbId = 999;

    fn artist_ref() -> UserRef {
        UserRef {
            id: ARTIST_ID,
            role: roles::ROLE_ARTIST.into(),
            is_active: true,
        }
    }

    fn request_input() -> RequestCommission {
        RequestCommission {
            artist_id: ARTIST_ID,
            title: "Fox character sheet".into(),
            description: "Full-body reference sheet".into(),
            requirements: Requirements::default(),
            budget: Budget {
                min: dec("100"),
                max: dec("300"),
            },
        }
    }

    fn quote_input(price: &str) -> SubmitQuote {
        SubmitQuote {
            proposed_price: dec(price),
            estimated_days: None,
            milestones: Vec::new(),
            terms: None,
        }
    }

    fn milestone_input(title: &str, pct: &str) -> MilestoneInput {
        MilestoneInput {
            title: title.into(),
            description: None,
            due_date: None,
            payment_percentage: dec(pct),
        }
    }

    fn now() -> Timestamp {
        ts("2026-03-02T12:00:00Z")
    }

    // -- request_commission --------------------------------------------------

    #[test]
    fn request_creates_pending_commission_and_notifies_artist() {
        let (new, intents) =
            request_commission(CLIENT_ID, &artist_ref(), request_input(), now()).unwrap();
        assert_eq!(new.status, CommissionStatus::Pending);
        assert_eq!(new.client_id, CLIENT_ID);
        assert_eq!(new.artist_id, ARTIST_ID);
        assert_eq!(new.timeline.estimated_days, None);
        assert_eq!(
            intents,
            vec![NotificationIntent {
                recipient_id: ARTIST_ID,
                kind: NotificationKind::CommissionRequested,
            }]
        );
    }

    #[test]
    fn request_derives_estimate_from_deadline() {
        let mut input = request_input();
        // 14 days and change rounds up to 15.
        input.requirements.deadline = Some(ts("2026-03-17T00:00:00Z"));
        let (new, _) = request_commission(CLIENT_ID, &artist_ref(), input, now()).unwrap();
        assert_eq!(new.timeline.estimated_days, Some(15));
    }

    #[test]
    fn request_rejects_past_deadline() {
        let mut input = request_input();
        input.requirements.deadline = Some(ts("2026-03-01T00:00:00Z"));
        assert_matches!(
            request_commission(CLIENT_ID, &artist_ref(), input, now()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn request_rejects_inverted_budget() {
        let mut input = request_input();
        input.budget = Budget {
            min: dec("300"),
            max: dec("100"),
        };
        assert_matches!(
            request_commission(CLIENT_ID, &artist_ref(), input, now()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn request_to_non_artist_is_not_found() {
        let target = UserRef {
            id: 30,
            role: roles::ROLE_CLIENT.into(),
            is_active: true,
        };
        assert_matches!(
            request_commission(CLIENT_ID, &target, request_input(), now()),
            Err(CoreError::NotFound {
                entity: "Artist",
                id: 30
            })
        );
    }

    #[test]
    fn request_to_inactive_artist_is_not_found() {
        let target = UserRef {
            is_active: false,
            ..artist_ref()
        };
        assert_matches!(
            request_commission(CLIENT_ID, &target, request_input(), now()),
            Err(CoreError::NotFound {
                entity: "Artist",
                id: ARTIST_ID
            })
        );
    }

    #[test]
    fn request_rejects_self_commission() {
        let target = UserRef {
            id: CLIENT_ID,
            role: roles::ROLE_ARTIST.into(),
            is_active: true,
        };
        assert_matches!(
            request_commission(CLIENT_ID, &target, request_input(), now()),
            Err(CoreError::Validation(_))
        );
    }

    // -- add_message ---------------------------------------------------------

    #[test]
    fn message_appends_and_notifies_counterparty() {
        let c = sample_commission();
        let t = add_message(
            &c,
            CLIENT_ID,
            SendMessage {
                text: "Any update?".into(),
                attachments: Vec::new(),
                message_type: None,
            },
            now(),
        )
        .unwrap();
        assert_eq!(t.commission.communication.len(), 1);
        let entry = &t.commission.communication[0];
        assert_eq!(entry.sender_id, CLIENT_ID);
        assert_eq!(entry.message_type, MessageType::Message);
        assert_eq!(entry.sent_at, now());
        assert_eq!(t.notifications[0].recipient_id, ARTIST_ID);
        assert_eq!(t.notifications[0].kind, NotificationKind::MessageReceived);
        // The input value is untouched.
        assert!(c.communication.is_empty());
    }

    #[test]
    fn message_from_outsider_is_forbidden() {
        let c = sample_commission();
        assert_matches!(
            add_message(
                &c,
                OUTSIDER_ID,
                SendMessage {
                    text: "hi".into(),
                    attachments: Vec::new(),
                    message_type: None,
                },
                now()
            ),
            Err(CoreError::Forbidden(_))
        );
    }

    #[test]
    fn message_works_in_terminal_status() {
        let c = commission_in(CommissionStatus::Cancelled);
        let t = add_message(
            &c,
            ARTIST_ID,
            SendMessage {
                text: "Sorry it did not work out".into(),
                attachments: Vec::new(),
                message_type: None,
            },
            now(),
        )
        .unwrap();
        assert_eq!(t.commission.status, CommissionStatus::Cancelled);
        assert_eq!(t.commission.communication.len(), 1);
    }

    #[test]
    fn status_change_type_is_reserved() {
        let c = sample_commission();
        assert_matches!(
            add_message(
                &c,
                CLIENT_ID,
                SendMessage {
                    text: "sneaky".into(),
                    attachments: Vec::new(),
                    message_type: Some(MessageType::StatusChange),
                },
                now()
            ),
            Err(CoreError::Validation(_))
        );
    }

    // -- submit_quote --------------------------------------------------------

    #[test]
    fn quote_moves_to_quoted_and_records_entry() {
        let c = sample_commission();
        let mut input = quote_input("250.00");
        input.estimated_days = Some(21);
        input.terms = Some("Half up front, half on delivery".into());
        let t = submit_quote(&c, ARTIST_ID, input, now()).unwrap();

        assert_eq!(t.commission.status, CommissionStatus::Quoted);
        assert_eq!(t.commission.proposed_price, Some(dec("250.00")));
        assert_eq!(t.commission.agreed_price, None);
        assert_eq!(t.commission.timeline.estimated_days, Some(21));
        let entry = t.commission.communication.last().unwrap();
        assert_eq!(entry.message_type, MessageType::Quote);
        assert_eq!(entry.text, "Half up front, half on delivery");
        assert_eq!(t.notifications[0].recipient_id, CLIENT_ID);
        assert_eq!(t.notifications[0].kind, NotificationKind::QuoteSubmitted);
    }

    #[test]
    fn quote_by_client_is_forbidden() {
        let c = sample_commission();
        assert_matches!(
            submit_quote(&c, CLIENT_ID, quote_input("250"), now()),
            Err(CoreError::Forbidden(_))
        );
    }

    #[test]
    fn quote_requires_negotiable_status() {
        for status in [
            CommissionStatus::Accepted,
            CommissionStatus::InProgress,
            CommissionStatus::Completed,
            CommissionStatus::Cancelled,
        ] {
            let c = commission_in(status);
            assert_matches!(
                submit_quote(&c, ARTIST_ID, quote_input("250"), now()),
                Err(CoreError::Validation(_)),
                "quote should be rejected in '{status}'"
            );
        }
    }

    #[test]
    fn requote_replaces_price_and_milestones() {
        let c = sample_commission();
        let mut first = quote_input("250");
        first.milestones = vec![milestone_input("Sketch", "50"), milestone_input("Final", "50")];
        let t1 = submit_quote(&c, ARTIST_ID, first, now()).unwrap();

        let later = ts("2026-03-03T09:00:00Z");
        let mut second = quote_input("300");
        second.milestones = vec![milestone_input("Everything", "100")];
        let t2 = submit_quote(&t1.commission, ARTIST_ID, second, later).unwrap();

        assert_eq!(t2.commission.proposed_price, Some(dec("300")));
        assert_eq!(t2.commission.milestones.len(), 1);
        assert_eq!(t2.commission.communication.len(), 2);
    }

    #[test]
    fn quote_rejects_bad_milestone_percentages() {
        let c = sample_commission();
        let mut input = quote_input("250");
        input.milestones = vec![milestone_input("Sketch", "40"), milestone_input("Final", "40")];
        assert_matches!(
            submit_quote(&c, ARTIST_ID, input, now()),
            Err(CoreError::Validation(msg)) => assert!(msg.contains("sum to 100"))
        );
    }

    #[test]
    fn quote_rejects_non_positive_price() {
        let c = sample_commission();
        assert_matches!(
            submit_quote(&c, ARTIST_ID, quote_input("0"), now()),
            Err(CoreError::Validation(_))
        );
    }

    // -- accept_quote --------------------------------------------------------

    fn quoted(price: &str) -> Commission {
        let c = sample_commission();
        submit_quote(&c, ARTIST_ID, quote_input(price), now())
            .unwrap()
            .commission
    }

    #[test]
    fn accept_fixes_price_and_derives_schedule() {
        let c = quoted("250.00");
        let accepted_at = ts("2026-03-04T10:00:00Z");
        let t = accept_quote(&c, CLIENT_ID, accepted_at).unwrap();

        assert_eq!(t.commission.status, CommissionStatus::Accepted);
        assert_eq!(t.commission.agreed_price, Some(dec("250.00")));
        assert_eq!(t.commission.timeline.start_date, Some(accepted_at));

        let schedule = t.commission.payment.as_ref().unwrap();
        assert_eq!(schedule.total_amount, dec("250.00"));
        assert_eq!(schedule.installments.len(), 2);
        assert_eq!(schedule.installments[0].amount, dec("125.00"));
        assert_eq!(schedule.installments[0].due_date, Some(accepted_at));
        assert_eq!(
            schedule.installments[1].due_date,
            Some(ts("2026-04-03T10:00:00Z"))
        );
        assert_eq!(t.notifications[0].recipient_id, ARTIST_ID);
        assert_eq!(t.notifications[0].kind, NotificationKind::QuoteAccepted);
    }

    #[test]
    fn accept_uses_estimate_for_expected_completion() {
        let c = sample_commission();
        let mut input = quote_input("100");
        input.estimated_days = Some(10);
        let quoted = submit_quote(&c, ARTIST_ID, input, now()).unwrap().commission;

        let accepted_at = ts("2026-03-04T10:00:00Z");
        let t = accept_quote(&quoted, CLIENT_ID, accepted_at).unwrap();
        let expected = ts("2026-03-14T10:00:00Z");
        assert_eq!(t.commission.timeline.expected_completion, Some(expected));
        // The default schedule's final installment lands on the same date.
        let schedule = t.commission.payment.as_ref().unwrap();
        assert_eq!(schedule.installments[1].due_date, Some(expected));
    }

    #[test]
    fn accept_with_milestones_schedules_per_milestone() {
        let c = sample_commission();
        let mut input = quote_input("200.00");
        input.milestones = vec![
            milestone_input("Sketch", "30"),
            milestone_input("Final", "70"),
        ];
        let quoted = submit_quote(&c, ARTIST_ID, input, now()).unwrap().commission;
        let t = accept_quote(&quoted, CLIENT_ID, now()).unwrap();

        let schedule = t.commission.payment.as_ref().unwrap();
        assert_eq!(schedule.installments.len(), 2);
        assert_eq!(schedule.installments[0].amount, dec("60.00"));
        assert_eq!(schedule.installments[1].amount, dec("140.00"));
    }

    #[test]
    fn accept_by_artist_is_forbidden() {
        let c = quoted("250");
        assert_matches!(
            accept_quote(&c, ARTIST_ID, now()),
            Err(CoreError::Forbidden(_))
        );
    }

    #[test]
    fn accept_twice_is_rejected() {
        let c = quoted("250");
        let t = accept_quote(&c, CLIENT_ID, now()).unwrap();
        assert_matches!(
            accept_quote(&t.commission, CLIENT_ID, now()),
            Err(CoreError::Validation(msg)) => assert!(msg.contains("'accepted'"))
        );
    }

    #[test]
    fn accept_without_quote_is_rejected() {
        let c = sample_commission();
        assert_matches!(
            accept_quote(&c, CLIENT_ID, now()),
            Err(CoreError::Validation(_))
        );
    }

    // -- upload_progress / review_progress ------------------------------------

    fn in_progress() -> Commission {
        commission_in(CommissionStatus::InProgress)
    }

    fn progress_input() -> UploadProgress {
        UploadProgress {
            title: "Line art".into(),
            description: Some("Clean lines, awaiting color".into()),
            images: vec!["https://cdn.example/wip-1.png".into()],
        }
    }

    #[test]
    fn progress_appends_unreviewed_entry() {
        let c = in_progress();
        let t = upload_progress(&c, ARTIST_ID, progress_input(), now()).unwrap();
        assert_eq!(t.commission.status, CommissionStatus::InProgress);
        let entry = &t.commission.work_in_progress[0];
        assert_eq!(entry.approved, None);
        assert_eq!(entry.uploaded_at, now());
        assert_eq!(t.notifications[0].recipient_id, CLIENT_ID);
        assert_eq!(t.notifications[0].kind, NotificationKind::ProgressUploaded);
    }

    #[test]
    fn progress_by_client_is_forbidden() {
        let c = in_progress();
        assert_matches!(
            upload_progress(&c, CLIENT_ID, progress_input(), now()),
            Err(CoreError::Forbidden(_))
        );
    }

    #[test]
    fn progress_requires_an_image() {
        let c = in_progress();
        let mut input = progress_input();
        input.images.clear();
        assert_matches!(
            upload_progress(&c, ARTIST_ID, input, now()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn progress_rejected_on_terminal_commission() {
        let c = commission_in(CommissionStatus::Cancelled);
        assert_matches!(
            upload_progress(&c, ARTIST_ID, progress_input(), now()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn review_progress_records_verdict_and_logs() {
        let c = in_progress();
        let t = upload_progress(&c, ARTIST_ID, progress_input(), now()).unwrap();
        let later = ts("2026-03-05T08:00:00Z");
        let t = review_progress(
            &t.commission,
            CLIENT_ID,
            0,
            ReviewProgress {
                approved: false,
                feedback: Some("Ears look off, please adjust".into()),
            },
            later,
        )
        .unwrap();

        let entry = &t.commission.work_in_progress[0];
        assert_eq!(entry.approved, Some(false));
        assert_eq!(entry.reviewed_at, Some(later));
        let log = t.commission.communication.last().unwrap();
        assert_eq!(log.message_type, MessageType::RevisionRequest);
        assert_eq!(log.text, "Ears look off, please adjust");
        assert_eq!(t.notifications[0].recipient_id, ARTIST_ID);
        assert_eq!(t.notifications[0].kind, NotificationKind::ProgressReviewed);
    }

    #[test]
    fn review_progress_approval_logs_approval() {
        let c = in_progress();
        let t = upload_progress(&c, ARTIST_ID, progress_input(), now()).unwrap();
        let t = review_progress(
            &t.commission,
            CLIENT_ID,
            0,
            ReviewProgress {
                approved: true,
                feedback: None,
            },
            now(),
        )
        .unwrap();
        let log = t.commission.communication.last().unwrap();
        assert_eq!(log.message_type, MessageType::Approval);
        assert_eq!(log.text, "Progress approved");
    }

    #[test]
    fn review_progress_unknown_index_is_not_found() {
        let c = in_progress();
        assert_matches!(
            review_progress(
                &c,
                CLIENT_ID,
                3,
                ReviewProgress {
                    approved: true,
                    feedback: None
                },
                now()
            ),
            Err(CoreError::NotFound {
                entity: "Progress update",
                id: 3
            })
        );
    }

    #[test]
    fn review_progress_by_artist_is_forbidden() {
        let c = in_progress();
        let t = upload_progress(&c, ARTIST_ID, progress_input(), now()).unwrap();
        assert_matches!(
            review_progress(
                &t.commission,
                ARTIST_ID,
                0,
                ReviewProgress {
                    approved: true,
                    feedback: None
                },
                now()
            ),
            Err(CoreError::Forbidden(_))
        );
    }

    // -- complete_milestone ---------------------------------------------------

    fn accepted_with_milestones() -> Commission {
        let c = sample_commission();
        let mut input = quote_input("200.00");
        input.milestones = vec![
            milestone_input("Sketch", "30"),
            milestone_input("Final", "70"),
        ];
        let quoted = submit_quote(&c, ARTIST_ID, input, now()).unwrap().commission;
        accept_quote(&quoted, CLIENT_ID, now()).unwrap().commission
    }

    #[test]
    fn milestone_completion_stamps_date_only() {
        let c = accepted_with_milestones();
        let later = ts("2026-03-10T12:00:00Z");
        let t = complete_milestone(&c, ARTIST_ID, 0, later).unwrap();

        assert!(t.commission.milestones[0].completed);
        assert_eq!(t.commission.milestones[0].completed_date, Some(later));
        assert!(!t.commission.milestones[1].completed);
        // No payment movement and no status change.
        let schedule = t.commission.payment.as_ref().unwrap();
        assert_eq!(schedule.paid_amount, Decimal::ZERO);
        assert!(!schedule.installments[0].paid);
        assert_eq!(t.commission.status, CommissionStatus::Accepted);
        assert_eq!(t.notifications[0].kind, NotificationKind::MilestoneCompleted);
    }

    #[test]
    fn milestone_completion_is_idempotent_rejected() {
        let c = accepted_with_milestones();
        let t = complete_milestone(&c, ARTIST_ID, 0, now()).unwrap();
        assert_matches!(
            complete_milestone(&t.commission, ARTIST_ID, 0, now()),
            Err(CoreError::Validation(msg)) => assert!(msg.contains("already completed"))
        );
    }

    #[test]
    fn milestone_out_of_range_is_not_found() {
        let c = accepted_with_milestones();
        assert_matches!(
            complete_milestone(&c, ARTIST_ID, 5, now()),
            Err(CoreError::NotFound {
                entity: "Milestone",
                id: 5
            })
        );
    }

    #[test]
    fn milestone_completion_by_client_is_forbidden() {
        let c = accepted_with_milestones();
        assert_matches!(
            complete_milestone(&c, CLIENT_ID, 0, now()),
            Err(CoreError::Forbidden(_))
        );
    }

    // -- update_status --------------------------------------------------------

    #[test]
    fn status_update_follows_graph_and_logs() {
        let c = commission_in(CommissionStatus::Accepted);
        let t = update_status(
            &c,
            ARTIST_ID,
            UpdateStatus {
                status: CommissionStatus::InProgress,
            },
            now(),
        )
        .unwrap();
        assert_eq!(t.commission.status, CommissionStatus::InProgress);
        let log = t.commission.communication.last().unwrap();
        assert_eq!(log.message_type, MessageType::StatusChange);
        assert!(log.text.contains("'accepted'") && log.text.contains("'in_progress'"));
        assert_eq!(t.notifications[0].recipient_id, CLIENT_ID);
        assert_eq!(t.notifications[0].kind, NotificationKind::StatusChanged);
    }

    #[test]
    fn status_update_off_graph_is_rejected() {
        let c = sample_commission();
        assert_matches!(
            update_status(
                &c,
                CLIENT_ID,
                UpdateStatus {
                    status: CommissionStatus::Delivered
                },
                now()
            ),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn status_update_cannot_enter_quoted_or_accepted() {
        let c = commission_in(CommissionStatus::Reviewing);
        assert_matches!(
            update_status(
                &c,
                ARTIST_ID,
                UpdateStatus {
                    status: CommissionStatus::Quoted
                },
                now()
            ),
            Err(CoreError::Validation(_))
        );
        let c = commission_in(CommissionStatus::Quoted);
        assert_matches!(
            update_status(
                &c,
                CLIENT_ID,
                UpdateStatus {
                    status: CommissionStatus::Accepted
                },
                now()
            ),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn completion_stamps_actual_date() {
        let c = commission_in(CommissionStatus::Review);
        let t = update_status(
            &c,
            CLIENT_ID,
            UpdateStatus {
                status: CommissionStatus::Completed,
            },
            now(),
        )
        .unwrap();
        assert_eq!(t.commission.timeline.actual_completion, Some(now()));
    }

    #[test]
    fn status_update_by_outsider_is_forbidden() {
        let c = sample_commission();
        assert_matches!(
            update_status(
                &c,
                OUTSIDER_ID,
                UpdateStatus {
                    status: CommissionStatus::Reviewing
                },
                now()
            ),
            Err(CoreError::Forbidden(_))
        );
    }

    // -- add_review -----------------------------------------------------------

    #[test]
    fn each_side_reviews_once() {
        let c = commission_in(CommissionStatus::Completed);
        let t = add_review(
            &c,
            CLIENT_ID,
            SubmitReview {
                rating: 5,
                comment: Some("Wonderful work".into()),
            },
            now(),
        )
        .unwrap();
        assert_eq!(t.commission.client_review.as_ref().unwrap().rating, 5);
        assert!(t.commission.artist_review.is_none());
        assert_eq!(t.notifications[0].recipient_id, ARTIST_ID);

        let t = add_review(
            &t.commission,
            ARTIST_ID,
            SubmitReview {
                rating: 4,
                comment: None,
            },
            now(),
        )
        .unwrap();
        assert_eq!(t.commission.artist_review.as_ref().unwrap().rating, 4);

        assert_matches!(
            add_review(
                &t.commission,
                CLIENT_ID,
                SubmitReview {
                    rating: 3,
                    comment: None
                },
                now()
            ),
            Err(CoreError::Validation(msg)) => assert!(msg.contains("already been submitted"))
        );
    }

    #[test]
    fn review_requires_completion() {
        let c = commission_in(CommissionStatus::InProgress);
        assert_matches!(
            add_review(
                &c,
                CLIENT_ID,
                SubmitReview {
                    rating: 5,
                    comment: None
                },
                now()
            ),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn review_allowed_after_delivery() {
        let c = commission_in(CommissionStatus::Delivered);
        assert!(add_review(
            &c,
            ARTIST_ID,
            SubmitReview {
                rating: 5,
                comment: None
            },
            now()
        )
        .is_ok());
    }

    #[test]
    fn review_rating_out_of_range() {
        let c = commission_in(CommissionStatus::Completed);
        assert_matches!(
            add_review(
                &c,
                CLIENT_ID,
                SubmitReview {
                    rating: 6,
                    comment: None
                },
                now()
            ),
            Err(CoreError::Validation(_))
        );
    }
}

//! Shared fixtures for the in-crate unit tests.

use rust_decimal::Decimal;

use crate::types::Timestamp;

use super::model::{Budget, Commission, Requirements, Timeline};
use super::status::CommissionStatus;

pub const CLIENT_ID: i64 = 10;
pub const ARTIST_ID: i64 = 20;

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn ts(s: &str) -> Timestamp {
    s.parse().unwrap()
}

/// A freshly requested commission in `pending` with an empty history.
pub fn sample_commission() -> Commission {
    Commission {
        id: 1,
        client_id: CLIENT_ID,
        artist_id: ARTIST_ID,
        title: "Fox character sheet".into(),
        description: "Full-body reference sheet for an anthro fox character".into(),
        requirements: Requirements {
            style: Some("cel shaded".into()),
            medium: Some("digital".into()),
            dimensions: Some("3000x2000".into()),
            reference_images: vec!["https://cdn.example/ref-1.png".into()],
            deadline: None,
        },
        budget: Budget {
            min: dec("100.00"),
            max: dec("300.00"),
        },
        proposed_price: None,
        agreed_price: None,
        status: CommissionStatus::Pending,
        timeline: Timeline::default(),
        milestones: Vec::new(),
        communication: Vec::new(),
        work_in_progress: Vec::new(),
        payment: None,
        client_review: None,
        artist_review: None,
        created_at: ts("2026-03-01T10:00:00Z"),
        updated_at: ts("2026-03-01T10:00:00Z"),
    }
}

/// Same commission with `status` overridden.
pub fn commission_in(status: CommissionStatus) -> Commission {
    Commission {
        status,
        ..sample_commission()
    }
}

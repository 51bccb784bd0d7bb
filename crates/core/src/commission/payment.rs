//! Payment schedule derivation.
//!
//! Runs exactly once per commission, at quote acceptance. The schedule is
//! a plan only: marking installments paid is the job of the external
//! payment processor integration, not of any lifecycle operation here.

use chrono::Duration;
use rust_decimal::Decimal;

use crate::types::Timestamp;

use super::model::{Installment, Milestone, PaymentSchedule, Timeline};

/// Days until the second default installment falls due when the timeline
/// has no expected completion date.
pub const DEFAULT_FINAL_DUE_DAYS: i64 = 30;

/// Money is rounded to cents.
const MONEY_DP: u32 = 2;

/// Derive the installment plan for an accepted quote.
///
/// With milestones, each installment is `agreed_price * percentage / 100`
/// rounded to cents and due when its milestone is due; the last
/// installment takes the remainder instead, so the amounts always sum to
/// exactly `agreed_price`. Without milestones the price splits 50/50: half
/// due immediately, half due at the expected completion date (or
/// [`DEFAULT_FINAL_DUE_DAYS`] from `now` when no date is known).
pub fn derive_schedule(
    agreed_price: Decimal,
    milestones: &[Milestone],
    timeline: &Timeline,
    now: Timestamp,
) -> PaymentSchedule {
    let installments = if milestones.is_empty() {
        split_half(agreed_price, timeline, now)
    } else {
        per_milestone(agreed_price, milestones)
    };
    PaymentSchedule {
        total_amount: agreed_price,
        paid_amount: Decimal::ZERO,
        installments,
    }
}

fn split_half(agreed_price: Decimal, timeline: &Timeline, now: Timestamp) -> Vec<Installment> {
    let upfront = (agreed_price / Decimal::TWO).round_dp(MONEY_DP);
    let final_due = timeline
        .expected_completion
        .unwrap_or(now + Duration::days(DEFAULT_FINAL_DUE_DAYS));
    vec![
        unpaid(upfront, Some(now)),
        unpaid(agreed_price - upfront, Some(final_due)),
    ]
}

fn per_milestone(agreed_price: Decimal, milestones: &[Milestone]) -> Vec<Installment> {
    let mut installments = Vec::with_capacity(milestones.len());
    let mut allocated = Decimal::ZERO;
    for (i, milestone) in milestones.iter().enumerate() {
        let amount = if i + 1 == milestones.len() {
            // Remainder absorbs any rounding drift from earlier shares.
            agreed_price - allocated
        } else {
            (agreed_price * milestone.payment_percentage / Decimal::ONE_HUNDRED).round_dp(MONEY_DP)
        };
        allocated += amount;
        installments.push(unpaid(amount, milestone.due_date));
    }
    installments
}

fn unpaid(amount: Decimal, due_date: Option<Timestamp>) -> Installment {
    Installment {
        amount,
        due_date,
        paid: false,
        paid_date: None,
        payment_reference: None,
    }
}

//! Field-level validation for commission operations.
//!
//! Everything here rejects with [`CoreError::Validation`] before any state
//! is touched; the lifecycle functions call these at the top of each
//! operation.

use rust_decimal::Decimal;

use crate::error::CoreError;

use super::model::{Budget, Milestone};

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;
pub const MAX_MESSAGE_LENGTH: usize = 5_000;
pub const MAX_ATTACHMENTS: usize = 10;
pub const MAX_MILESTONES: usize = 20;
pub const MAX_PROGRESS_IMAGES: usize = 20;
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Milestone percentages must sum to exactly this.
pub const MILESTONE_PERCENTAGE_TOTAL: Decimal = Decimal::ONE_HUNDRED;

// ---------------------------------------------------------------------------
// Validators
// ---------------------------------------------------------------------------

pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    if title.len() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title exceeds maximum length of {MAX_TITLE_LENGTH} characters (got {})",
            title.len()
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), CoreError> {
    if description.trim().is_empty() {
        return Err(CoreError::Validation("Description must not be empty".into()));
    }
    if description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Description exceeds maximum length of {MAX_DESCRIPTION_LENGTH} characters (got {})",
            description.len()
        )));
    }
    Ok(())
}

/// Budget bounds must be non-negative and ordered.
pub fn validate_budget(budget: &Budget) -> Result<(), CoreError> {
    if budget.min < Decimal::ZERO {
        return Err(CoreError::Validation(
            "Budget minimum must not be negative".into(),
        ));
    }
    if budget.max < budget.min {
        return Err(CoreError::Validation(format!(
            "Budget maximum ({}) must not be below the minimum ({})",
            budget.max, budget.min
        )));
    }
    Ok(())
}

pub fn validate_price(price: Decimal) -> Result<(), CoreError> {
    if price <= Decimal::ZERO {
        return Err(CoreError::Validation(format!(
            "Price must be positive (got {price})"
        )));
    }
    Ok(())
}

pub fn validate_message_text(text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation("Message text must not be empty".into()));
    }
    if text.len() > MAX_MESSAGE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Message exceeds maximum length of {MAX_MESSAGE_LENGTH} characters (got {})",
            text.len()
        )));
    }
    Ok(())
}

pub fn validate_attachments(attachments: &[String]) -> Result<(), CoreError> {
    if attachments.len() > MAX_ATTACHMENTS {
        return Err(CoreError::Validation(format!(
            "At most {MAX_ATTACHMENTS} attachments per message (got {})",
            attachments.len()
        )));
    }
    Ok(())
}

pub fn validate_rating(rating: i32) -> Result<(), CoreError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(CoreError::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING} (got {rating})"
        )));
    }
    Ok(())
}

pub fn validate_progress_images(images: &[String]) -> Result<(), CoreError> {
    if images.is_empty() {
        return Err(CoreError::Validation(
            "A progress update needs at least one image".into(),
        ));
    }
    if images.len() > MAX_PROGRESS_IMAGES {
        return Err(CoreError::Validation(format!(
            "At most {MAX_PROGRESS_IMAGES} images per progress update (got {})",
            images.len()
        )));
    }
    Ok(())
}

/// Validate a quoted milestone plan: titles present, percentages positive,
/// and the percentages summing to exactly 100. An empty plan is valid and
/// selects the default half-up-front schedule.
pub fn validate_milestones(milestones: &[Milestone]) -> Result<(), CoreError> {
    if milestones.is_empty() {
        return Ok(());
    }
    if milestones.len() > MAX_MILESTONES {
        return Err(CoreError::Validation(format!(
            "At most {MAX_MILESTONES} milestones per quote (got {})",
            milestones.len()
        )));
    }
    let mut total = Decimal::ZERO;
    for (i, milestone) in milestones.iter().enumerate() {
        if milestone.title.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Milestone {} has an empty title",
                i + 1
            )));
        }
        if milestone.payment_percentage <= Decimal::ZERO {
            return Err(CoreError::Validation(format!(
                "Milestone '{}' must have a positive payment percentage (got {})",
                milestone.title, milestone.payment_percentage
            )));
        }
        total += milestone.payment_percentage;
    }
    if total != MILESTONE_PERCENTAGE_TOTAL {
        return Err(CoreError::Validation(format!(
            "Milestone payment percentages must sum to 100 (got {total})"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! The commission aggregate: model, status graph, validation, lifecycle
//! operations, and payment schedule derivation.

pub mod lifecycle;
pub mod model;
pub mod payment;
pub mod status;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use lifecycle::{NotificationIntent, NotificationKind, Transition, UserRef};
pub use model::{Commission, NewCommission};
pub use status::CommissionStatus;

//! In-process event bus and notification delivery.
//!
//! Lifecycle operations publish [`bus::PlatformEvent`]s; consumers
//! subscribe independently. The only built-in consumer is the email
//! notifier in `atelier-api`, which uses [`delivery::EmailDelivery`].

pub mod bus;
pub mod delivery;

pub use bus::{EventBus, PlatformEvent};

//! Background consumers for the platform event bus.

pub mod mailer;

pub use mailer::NotificationMailer;

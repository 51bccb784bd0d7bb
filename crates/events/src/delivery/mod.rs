pub mod email;

pub use email::{EmailConfig, EmailDelivery, EmailError};

pub mod commission;
pub mod user;

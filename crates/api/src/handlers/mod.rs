pub mod commissions;
pub mod users;

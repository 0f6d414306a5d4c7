pub mod identity;
pub mod tips;
pub mod users;

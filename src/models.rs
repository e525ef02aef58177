pub mod auth;
pub mod record;
pub mod reports;
pub mod shift;
pub mod workforce;

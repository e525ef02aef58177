pub mod auth;
pub mod costing;
pub mod notification;
pub mod record_service;
pub mod shift_service;
pub mod tenancy;

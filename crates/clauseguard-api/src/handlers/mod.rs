pub mod auth;
pub mod contracts;
pub mod health;
pub mod payments;

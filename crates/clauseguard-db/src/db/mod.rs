//! Database repositories for data access layer
//
// Contract analyses
pub mod analysis;
//
// Accounts created through Google sign-in
pub mod user;
//
// Process-local stores
pub mod memory;

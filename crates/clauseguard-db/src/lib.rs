//! ClauseGuard Database Layer
//!
//! Repositories for users and contract analyses. Each store is a trait with a
//! PostgreSQL implementation and an in-memory one for local runs and tests.

pub mod db;

pub use db::analysis::{AnalysisRepository, AnalysisStore};
pub use db::memory::{InMemoryAnalysisStore, InMemoryUserStore};
pub use db::user::{UserRepository, UserStore};

//! Application state shared by every handler.
//!
//! Every collaborator outside the process sits behind a trait object so the
//! same router runs against PostgreSQL/Redis/Anthropic in production and
//! in-memory stand-ins in tests.

use clauseguard_cache::BlobCache;
use clauseguard_core::Config;
use clauseguard_db::{AnalysisStore, UserStore};
use clauseguard_services::{
    ContractAi, EmailService, IdentityProvider, PaymentProvider, TextExtractor,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Uploaded files and serialized analyses
    pub cache: Arc<dyn BlobCache>,
    pub analyses: Arc<dyn AnalysisStore>,
    pub users: Arc<dyn UserStore>,
    pub extractor: Arc<dyn TextExtractor>,
    pub ai: Arc<dyn ContractAi>,
    pub identity: Arc<dyn IdentityProvider>,
    pub payments: Arc<dyn PaymentProvider>,
    /// `None` when email is disabled
    pub email: Option<EmailService>,
}

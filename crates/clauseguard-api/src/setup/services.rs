//! Wiring of repositories, the blob cache and external clients into [`AppState`].

use crate::state::AppState;
use anyhow::{Context, Result};
use clauseguard_cache::RedisCache;
use clauseguard_core::Config;
use clauseguard_db::{AnalysisRepository, UserRepository};
use clauseguard_services::{
    AnthropicContractAi, EmailService, GoogleOAuthClient, PdfTextExtractor, StripeClient,
};
use sqlx::PgPool;
use std::sync::Arc;

pub async fn initialize_services(config: &Config, pool: PgPool) -> Result<Arc<AppState>> {
    let cache = RedisCache::connect(config.redis_url())
        .await
        .context("Failed to connect to Redis")?;
    tracing::info!("Blob cache connected");

    let ai = AnthropicContractAi::new(
        config.anthropic_api_key(),
        config.anthropic_model(),
        config.anthropic_max_tokens(),
    )
    .context("Failed to create Anthropic client")?;
    tracing::info!(model = %config.anthropic_model(), "Contract AI configured");

    let identity = GoogleOAuthClient::new(
        config.google_client_id(),
        config.google_client_secret(),
        config.google_callback_url(),
    )
    .context("Failed to create Google OAuth client")?;

    let payments =
        StripeClient::new(config.stripe_secret_key()).context("Failed to create Stripe client")?;

    let email = EmailService::from_config(config);
    if email.is_none() {
        tracing::info!("Premium confirmation emails disabled");
    }

    Ok(Arc::new(AppState {
        config: config.clone(),
        cache: Arc::new(cache),
        analyses: Arc::new(AnalysisRepository::new(pool.clone())),
        users: Arc::new(UserRepository::new(pool)),
        extractor: Arc::new(PdfTextExtractor::new()),
        ai: Arc::new(ai),
        identity: Arc::new(identity),
        payments: Arc::new(payments),
        email,
    }))
}

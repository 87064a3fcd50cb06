//! Shared setup for API integration tests.
//!
//! The router runs against the in-memory cache and stores plus stub
//! extractor / model / identity / payment providers, so no external service
//! is needed.

#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use axum_test::TestServer;
use bytes::Bytes;
use clauseguard_api::auth::session::issue_token;
use clauseguard_api::AppState;
use clauseguard_cache::InMemoryCache;
use clauseguard_core::models::{
    AnalysisOutcome, GoogleProfile, Level, OpportunityItem, RiskItem, User,
};
use clauseguard_core::{BaseConfig, Config, ServiceConfig};
use clauseguard_db::{InMemoryAnalysisStore, InMemoryUserStore, UserStore};
use clauseguard_services::{
    AiError, BillingError, CheckoutRequest, CheckoutSession, ContractAi, ExtractionError,
    IdentityProvider, OAuthError, PaymentProvider, TextExtractor,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const WEBHOOK_SECRET: &str = "whsec_integration";
pub const DETECTED_TYPE: &str = "Non-Disclosure Agreement";
pub const STUB_SCORE: i32 = 72;
pub const STUB_MODEL: &str = "stub-model";
pub const CLIENT_URL: &str = "http://localhost:3000";

pub fn test_config() -> Config {
    Config(Box::new(ServiceConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            db_max_connections: 1,
            db_timeout_seconds: 1,
            jwt_secret: JWT_SECRET.to_string(),
            jwt_expiry_hours: 24,
            environment: "development".to_string(),
        },
        database_url: "postgres://unused".to_string(),
        redis_url: "redis://unused".to_string(),
        max_contract_size_bytes: 1024 * 1024,
        anthropic_api_key: "sk-test".to_string(),
        anthropic_model: STUB_MODEL.to_string(),
        anthropic_max_tokens: 1024,
        google_client_id: "client".to_string(),
        google_client_secret: "secret".to_string(),
        google_callback_url: "http://localhost:8080/auth/google/callback".to_string(),
        client_url: CLIENT_URL.to_string(),
        stripe_secret_key: "sk_test".to_string(),
        stripe_webhook_secret: WEBHOOK_SECRET.to_string(),
        premium_price_cents: 1000,
        email_enabled: false,
        smtp_host: None,
        smtp_port: None,
        smtp_user: None,
        smtp_password: None,
        smtp_from: None,
        smtp_tls: true,
    }))
}

/// Returns fixed text, or fails every call when `fail` is set.
pub struct StubExtractor {
    pub fail: bool,
    pub calls: AtomicUsize,
}

#[async_trait]
impl TextExtractor for StubExtractor {
    async fn extract_text(&self, data: Bytes) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ExtractionError::Parse("stub parser refused input".to_string()));
        }
        Ok(format!("CONTRACT TEXT ({} bytes)", data.len()))
    }
}

/// Fixed classifier and analysis; `fail_analysis` makes every analysis call fail.
pub struct StubAi {
    pub fail_analysis: bool,
}

pub fn stub_outcome() -> AnalysisOutcome {
    AnalysisOutcome {
        overall_score: STUB_SCORE,
        risks: vec![RiskItem {
            risk: "Unlimited liability".to_string(),
            explanation: "No cap on damages".to_string(),
            severity: Level::High,
        }],
        opportunities: vec![OpportunityItem {
            opportunity: "Mutual termination".to_string(),
            explanation: "Either party may exit with notice".to_string(),
            impact: Level::Medium,
        }],
        summary: "A standard mutual NDA.".to_string(),
        ..Default::default()
    }
}

#[async_trait]
impl ContractAi for StubAi {
    async fn detect_type(&self, _contract_text: &str) -> Result<String, AiError> {
        Ok(DETECTED_TYPE.to_string())
    }

    async fn analyze(
        &self,
        _contract_text: &str,
        _contract_type: &str,
    ) -> Result<AnalysisOutcome, AiError> {
        if self.fail_analysis {
            return Err(AiError::Parse("stub model returned no JSON".to_string()));
        }
        Ok(stub_outcome())
    }

    fn model_id(&self) -> &str {
        STUB_MODEL
    }
}

/// Accepts the code `good-code` and returns `profile`.
pub struct StubIdentity {
    pub profile: GoogleProfile,
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    fn authorization_url(&self, state: &str) -> String {
        format!("https://accounts.example.com/auth?state={}", state)
    }

    async fn exchange_code(&self, code: &str) -> Result<GoogleProfile, OAuthError> {
        if code == "good-code" {
            Ok(self.profile.clone())
        } else {
            Err(OAuthError::TokenExchange {
                status: 400,
                body: "invalid_grant".to_string(),
            })
        }
    }
}

/// Records every checkout request.
#[derive(Default)]
pub struct StubPayments {
    pub requests: Mutex<Vec<CheckoutRequest>>,
}

#[async_trait]
impl PaymentProvider for StubPayments {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, BillingError> {
        self.requests.lock().unwrap().push(request);
        Ok(CheckoutSession {
            id: "cs_test_123".to_string(),
            url: Some("https://checkout.stripe.test/cs_test_123".to_string()),
        })
    }
}

pub fn google_profile(name: &str) -> GoogleProfile {
    GoogleProfile {
        google_id: format!("google-{}", name),
        email: format!("{}@example.com", name),
        display_name: name.to_string(),
        profile_picture: None,
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub config: Config,
    pub cache: Arc<InMemoryCache>,
    pub analyses: Arc<InMemoryAnalysisStore>,
    pub users: Arc<InMemoryUserStore>,
    pub extractor: Arc<StubExtractor>,
    pub payments: Arc<StubPayments>,
}

pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Create an account through the user store and mint a session token for it.
    pub async fn sign_in(&self, name: &str) -> TestUser {
        let user = self
            .users
            .upsert_google_user(&google_profile(name))
            .await
            .expect("Failed to create test user");
        let token = issue_token(user.id, JWT_SECRET, 1).expect("Failed to issue token");
        TestUser { user, token }
    }

    /// Keys currently staged for uploads by `user_id`.
    pub async fn staged_uploads(&self, user_id: Uuid) -> Vec<String> {
        self.cache
            .keys_with_prefix(&format!("file:{}:", user_id))
            .await
    }
}

pub async fn setup_test_app() -> TestApp {
    build_test_app(false, false).await
}

/// Every extraction fails.
pub async fn setup_test_app_with(failing_extractor: bool) -> TestApp {
    build_test_app(failing_extractor, false).await
}

/// Extraction succeeds but every analysis call to the model fails.
pub async fn setup_test_app_with_failing_ai() -> TestApp {
    build_test_app(false, true).await
}

async fn build_test_app(failing_extractor: bool, failing_ai: bool) -> TestApp {
    let config = test_config();
    let cache = Arc::new(InMemoryCache::new());
    let analyses = Arc::new(InMemoryAnalysisStore::new());
    let users = Arc::new(InMemoryUserStore::new());
    let extractor = Arc::new(StubExtractor {
        fail: failing_extractor,
        calls: AtomicUsize::new(0),
    });
    let payments = Arc::new(StubPayments::default());

    let state = Arc::new(AppState {
        config: config.clone(),
        cache: cache.clone(),
        analyses: analyses.clone(),
        users: users.clone(),
        extractor: extractor.clone(),
        ai: Arc::new(StubAi {
            fail_analysis: failing_ai,
        }),
        identity: Arc::new(StubIdentity {
            profile: google_profile("oauth-user"),
        }),
        payments: payments.clone(),
        email: None,
    });

    let router = clauseguard_api::setup::routes::setup_routes(&config, state)
        .await
        .expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        config,
        cache,
        analyses,
        users,
        extractor,
        payments,
    }
}

//! Stripe Checkout sessions and webhook verification.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Maximum age of a webhook signature timestamp.
pub const WEBHOOK_TOLERANCE_SECS: i64 = 300;

pub const PREMIUM_PRODUCT_NAME: &str = "Lifetime Subscription";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Stripe request failed: {0}")]
    Request(String),

    #[error("Stripe API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid webhook signature: {0}")]
    Signature(String),

    #[error("Invalid webhook payload: {0}")]
    Payload(String),
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub user_id: Uuid,
    pub customer_email: String,
    pub amount_cents: i64,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Payment provider seam used by the payments routes.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, BillingError>;
}

#[derive(Clone)]
pub struct StripeClient {
    http_client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(secret_key: impl Into<String>) -> Result<Self, BillingError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BillingError::Request(e.to_string()))?;
        Ok(Self {
            http_client,
            api_base: STRIPE_API_BASE.to_string(),
            secret_key: secret_key.into(),
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }
}

fn checkout_form(request: &CheckoutRequest) -> Vec<(&'static str, String)> {
    vec![
        ("mode", "payment".to_string()),
        ("payment_method_types[]", "card".to_string()),
        ("line_items[0][price_data][currency]", "usd".to_string()),
        (
            "line_items[0][price_data][product_data][name]",
            PREMIUM_PRODUCT_NAME.to_string(),
        ),
        (
            "line_items[0][price_data][unit_amount]",
            request.amount_cents.to_string(),
        ),
        ("line_items[0][quantity]", "1".to_string()),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
        ("client_reference_id", request.user_id.to_string()),
        ("customer_email", request.customer_email.clone()),
    ]
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, BillingError> {
        let response = self
            .http_client
            .post(format!("{}/checkout/sessions", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&checkout_form(&request))
            .send()
            .await
            .map_err(|e| BillingError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, user_id = %request.user_id, "Stripe checkout session creation failed");
            return Err(BillingError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let session: CheckoutSession = response
            .json()
            .await
            .map_err(|e| BillingError::Request(e.to_string()))?;
        tracing::info!(session_id = %session.id, user_id = %request.user_id, "Created checkout session");
        Ok(session)
    }
}

/// Verify a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=<hex>...]`) against the raw body.
pub fn verify_webhook_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now_unix: i64,
) -> Result<(), BillingError> {
    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| BillingError::Signature("missing timestamp".into()))?;
    let ts: i64 = timestamp
        .parse()
        .map_err(|_| BillingError::Signature("malformed timestamp".into()))?;
    if now_unix.abs_diff(ts) > WEBHOOK_TOLERANCE_SECS as u64 {
        return Err(BillingError::Signature(
            "timestamp outside tolerance".into(),
        ));
    }
    if signatures.is_empty() {
        return Err(BillingError::Signature("no v1 signature".into()));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BillingError::Signature(e.to_string()))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = signatures.iter().any(|sig| match hex::decode(sig) {
        Ok(bytes) => mac.clone().verify_slice(&bytes).is_ok(),
        Err(_) => false,
    });
    if matched {
        Ok(())
    } else {
        Err(BillingError::Signature("signature mismatch".into()))
    }
}

/// Compute the `v1` signature for a payload; used to sign test fixtures and local replays.
pub fn sign_webhook_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        // HMAC accepts keys of any length
        Err(_) => return String::new(),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct CompletedCheckout {
    pub id: String,
    #[serde(default)]
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
}

impl StripeEvent {
    pub fn parse(payload: &[u8]) -> Result<Self, BillingError> {
        serde_json::from_slice(payload).map_err(|e| BillingError::Payload(e.to_string()))
    }

    /// The checkout session of a `checkout.session.completed` event.
    pub fn completed_checkout(&self) -> Result<Option<CompletedCheckout>, BillingError> {
        if self.event_type != "checkout.session.completed" {
            return Ok(None);
        }
        serde_json::from_value(self.data.object.clone())
            .map(Some)
            .map_err(|e| BillingError::Payload(e.to_string()))
    }
}

impl CompletedCheckout {
    /// The user who paid, taken from `client_reference_id`.
    pub fn user_id(&self) -> Option<Uuid> {
        self.client_reference_id
            .as_deref()
            .and_then(|id| Uuid::parse_str(id).ok())
    }

    pub fn is_paid(&self) -> bool {
        matches!(self.payment_status.as_deref(), None | Some("paid"))
    }
}

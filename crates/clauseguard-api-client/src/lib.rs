//! HTTP client for the ClauseGuard API.
//!
//! Provides a minimal client authenticated with a session token, generic
//! GET/POST/DELETE helpers, and domain methods (detect, analyze, list, etc.).
//! The [`upload_flow`] module drives the detect → confirm → analyze sequence
//! on top of it.

pub mod api;
pub mod upload_flow;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Authentication strategy for the API.
#[derive(Clone, Debug)]
pub enum Auth {
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// `Cookie: session={token}`, as a browser would send it
    SessionCookie(String),
}

/// HTTP client for the ClauseGuard API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: String, auth: Auth) -> Result<Self> {
        // Analysis waits on the model; leave it plenty of room.
        let client = Client::builder()
            .timeout(Duration::from_secs(180))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Create client from environment: CLAUSEGUARD_API_URL (or API_URL) and
    /// CLAUSEGUARD_TOKEN (or JWT_TOKEN), sent as a Bearer token.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("CLAUSEGUARD_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        let token = std::env::var("CLAUSEGUARD_TOKEN")
            .or_else(|_| std::env::var("JWT_TOKEN"))
            .context("Missing session token. Set CLAUSEGUARD_TOKEN or JWT_TOKEN")?;

        Self::new(base_url, Auth::Bearer(token))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
            Auth::SessionCookie(token) => request.header("Cookie", format!("session={}", token)),
        }
    }

    /// Send with auth applied; any non-2xx status becomes an error carrying the body.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self
            .apply_auth(request)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        Ok(response)
    }

    /// GET request. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.client.get(self.build_url(path))).await?;
        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        let request = self.client.post(self.build_url(path)).multipart(form);
        let response = self.send(request).await?;
        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// DELETE request. Returns Ok(()) on success.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(self.client.delete(self.build_url(path))).await?;
        Ok(())
    }
}

pub use api::{CheckoutSessionResponse, ContractFile};
pub use clauseguard_core::models::{ContractAnalysis, MembershipStatusResponse, User};
pub use upload_flow::{ContractBackend, FlowError, UploadFlow, UploadStep};

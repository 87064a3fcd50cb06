//! Google OAuth 2.0 authorization-code flow.

use async_trait::async_trait;
use clauseguard_core::models::GoogleProfile;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const SCOPES: &str = "openid email profile";

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("OAuth request failed: {0}")]
    Request(String),

    #[error("Token exchange rejected ({status}): {body}")]
    TokenExchange { status: u16, body: String },

    #[error("Failed to fetch user profile ({status})")]
    Profile { status: u16 },

    #[error("Google account has no verified email")]
    UnverifiedEmail,
}

/// Sign-in provider seam: builds the consent URL and turns a callback code into an identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn authorization_url(&self, state: &str) -> String;

    async fn exchange_code(&self, code: &str) -> Result<GoogleProfile, OAuthError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Clone)]
pub struct GoogleOAuthClient {
    http_client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    token_url: String,
    userinfo_url: String,
}

impl GoogleOAuthClient {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Result<Self, OAuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| OAuthError::Request(e.to_string()))?;

        Ok(Self {
            http_client,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            token_url: TOKEN_URL.to_string(),
            userinfo_url: USERINFO_URL.to_string(),
        })
    }

    /// Override the token and userinfo endpoints.
    pub fn with_endpoints(mut self, token_url: impl Into<String>, userinfo_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self.userinfo_url = userinfo_url.into();
        self
    }
}

#[async_trait]
impl IdentityProvider for GoogleOAuthClient {
    fn authorization_url(&self, state: &str) -> String {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", SCOPES),
            ("state", state),
            ("prompt", "select_account"),
        ];
        match reqwest::Url::parse_with_params(AUTHORIZE_URL, &params) {
            Ok(url) => url.to_string(),
            // AUTHORIZE_URL is a constant; parsing cannot fail
            Err(_) => AUTHORIZE_URL.to_string(),
        }
    }

    async fn exchange_code(&self, code: &str) -> Result<GoogleProfile, OAuthError> {
        let response = self
            .http_client
            .post(&self.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| OAuthError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::TokenExchange {
                status: status.as_u16(),
                body,
            });
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::Request(e.to_string()))?;

        let response = self
            .http_client
            .get(&self.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| OAuthError::Request(e.to_string()))?;
        if !response.status().is_success() {
            return Err(OAuthError::Profile {
                status: response.status().as_u16(),
            });
        }
        let info: UserInfo = response
            .json()
            .await
            .map_err(|e| OAuthError::Request(e.to_string()))?;

        into_profile(info)
    }
}

fn into_profile(info: UserInfo) -> Result<GoogleProfile, OAuthError> {
    if info.email_verified == Some(false) {
        return Err(OAuthError::UnverifiedEmail);
    }
    let email = info.email.ok_or(OAuthError::UnverifiedEmail)?;
    let display_name = info
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

    Ok(GoogleProfile {
        google_id: info.sub,
        email,
        display_name,
        profile_picture: info.picture,
    })
}

//! Google sign-in and session endpoints.

use crate::auth::middleware::secure_compare;
use crate::auth::models::UserContext;
use crate::auth::session::{build_cookie, expired_cookie, issue_token, read_cookie};
use crate::constants::OAUTH_STATE_MAX_AGE_SECS;
use crate::error::ErrorResponse;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Json,
};
use clauseguard_core::constants::{OAUTH_STATE_COOKIE, SESSION_COOKIE};
use clauseguard_core::models::User;
use clauseguard_core::AppError;
use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

fn generate_oauth_state() -> String {
    let mut rng = rand::rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.random()).collect();
    hex::encode(random_bytes)
}

#[utoipa::path(
    get,
    path = "/auth/google",
    tag = "auth",
    responses((status = 303, description = "Redirect to Google's consent screen"))
)]
pub async fn google_login(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let oauth_state = generate_oauth_state();
    let url = state.identity.authorization_url(&oauth_state);
    let cookie = build_cookie(
        OAUTH_STATE_COOKIE,
        &oauth_state,
        OAUTH_STATE_MAX_AGE_SECS,
        state.config.is_production(),
    );

    (
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Redirect::to(&url),
    )
}

/// Verify the callback, upsert the user and mint a session token.
async fn complete_sign_in(
    state: &AppState,
    headers: &HeaderMap,
    query: OAuthCallbackQuery,
) -> Result<String, AppError> {
    if let Some(error) = query.error {
        return Err(AppError::InvalidOAuthToken(format!(
            "Google returned error: {}",
            error
        )));
    }

    let expected = read_cookie(headers, OAUTH_STATE_COOKIE)
        .ok_or_else(|| AppError::InvalidOAuthToken("Missing OAuth state cookie".to_string()))?;
    let received = query.state.unwrap_or_default();
    if !secure_compare(expected, &received) {
        return Err(AppError::InvalidOAuthToken("OAuth state mismatch".to_string()));
    }

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::InvalidOAuthToken("Missing authorization code".to_string()))?;

    let profile = state
        .identity
        .exchange_code(&code)
        .await
        .map_err(|e| AppError::InvalidOAuthToken(e.to_string()))?;

    let user = state.users.upsert_google_user(&profile).await?;
    tracing::info!(user_id = %user.id, "User signed in with Google");

    issue_token(
        user.id,
        state.config.jwt_secret(),
        state.config.jwt_expiry_hours(),
    )
}

#[utoipa::path(
    get,
    path = "/auth/google/callback",
    tag = "auth",
    params(
        ("code" = Option<String>, Query, description = "Authorization code"),
        ("state" = Option<String>, Query, description = "Anti-forgery state")
    ),
    responses((status = 303, description = "Redirect to the dashboard, or to the login page on failure"))
)]
pub async fn google_callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<OAuthCallbackQuery>,
) -> Response {
    let secure = state.config.is_production();
    let clear_state = expired_cookie(OAUTH_STATE_COOKIE, secure);

    match complete_sign_in(&state, &headers, query).await {
        Ok(token) => {
            let max_age = state.config.jwt_expiry_hours() * 3600;
            let session = build_cookie(SESSION_COOKIE, &token, max_age, secure);
            (
                AppendHeaders([
                    (header::SET_COOKIE, clear_state),
                    (header::SET_COOKIE, session),
                ]),
                Redirect::to(&format!("{}/dashboard", state.config.client_url())),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Google sign-in failed");
            (
                AppendHeaders([(header::SET_COOKIE, clear_state)]),
                Redirect::to(&format!("{}/login", state.config.client_url())),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/auth/current-user",
    tag = "auth",
    responses(
        (status = 200, description = "The signed-in user", body = User),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn current_user(user_ctx: UserContext) -> Json<User> {
    Json(user_ctx.user)
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses((status = 204, description = "Session cookie cleared"))
)]
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cookie = expired_cookie(SESSION_COOKIE, state.config.is_production());
    (
        StatusCode::NO_CONTENT,
        AppendHeaders([(header::SET_COOKIE, cookie)]),
    )
}

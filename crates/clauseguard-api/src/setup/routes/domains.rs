//! Domain route groups (contracts, auth, payments).

use crate::constants::{AUTH_PREFIX, CONTRACTS_PREFIX, PAYMENTS_PREFIX};
use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub fn contract_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/detect-type", CONTRACTS_PREFIX),
            post(handlers::contracts::detect_contract_type),
        )
        .route(
            &format!("{}/analyze", CONTRACTS_PREFIX),
            post(handlers::contracts::analyze_contract),
        )
        .route(
            &format!("{}/user-contracts", CONTRACTS_PREFIX),
            get(handlers::contracts::list_user_contracts),
        )
        .route(
            &format!("{}/{{id}}", CONTRACTS_PREFIX),
            get(handlers::contracts::get_contract).delete(handlers::contracts::delete_contract),
        )
        .with_state(state)
}

/// Sign-in and sign-out; no session required.
pub fn public_auth_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/google", AUTH_PREFIX),
            get(handlers::auth::google_login),
        )
        .route(
            &format!("{}/google/callback", AUTH_PREFIX),
            get(handlers::auth::google_callback),
        )
        .route(
            &format!("{}/logout", AUTH_PREFIX),
            post(handlers::auth::logout),
        )
        .with_state(state)
}

pub fn session_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/current-user", AUTH_PREFIX),
            get(handlers::auth::current_user),
        )
        .with_state(state)
}

pub fn payment_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/create-checkout-session", PAYMENTS_PREFIX),
            get(handlers::payments::create_checkout_session),
        )
        .route(
            &format!("{}/membership-status", PAYMENTS_PREFIX),
            get(handlers::payments::membership_status),
        )
        .with_state(state)
}

/// Stripe calls this; authenticity comes from the signature, not a session.
pub fn webhook_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/webhook", PAYMENTS_PREFIX),
            post(handlers::payments::stripe_webhook),
        )
        .with_state(state)
}

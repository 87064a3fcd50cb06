//! Stripe checkout, membership status and the Stripe webhook.

use crate::auth::models::UserContext;
use crate::constants::STRIPE_SIGNATURE_HEADER;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::State,
    http::HeaderMap,
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use clauseguard_core::models::MembershipStatusResponse;
use clauseguard_core::AppError;
use clauseguard_services::billing::{verify_webhook_signature, CompletedCheckout};
use clauseguard_services::{CheckoutRequest, StripeEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    pub received: bool,
}

#[utoipa::path(
    get,
    path = "/payments/create-checkout-session",
    tag = "payments",
    responses(
        (status = 200, description = "Checkout session created", body = CheckoutSessionResponse),
        (status = 400, description = "Already premium", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Stripe error", body = ErrorResponse)
    )
)]
pub async fn create_checkout_session(
    State(state): State<Arc<AppState>>,
    user_ctx: UserContext,
) -> Result<Json<CheckoutSessionResponse>, HttpAppError> {
    let user = user_ctx.user;
    if user.is_premium {
        return Err(AppError::BadRequest("User already has premium membership".to_string()).into());
    }

    let client_url = state.config.client_url();
    let session = state
        .payments
        .create_checkout_session(CheckoutRequest {
            user_id: user.id,
            customer_email: user.email.clone(),
            amount_cents: state.config.premium_price_cents(),
            success_url: format!("{}/payment-success", client_url),
            cancel_url: format!("{}/payment-cancel", client_url),
        })
        .await?;

    Ok(Json(CheckoutSessionResponse {
        session_id: session.id,
        url: session.url,
    }))
}

#[utoipa::path(
    get,
    path = "/payments/membership-status",
    tag = "payments",
    responses(
        (status = 200, description = "Membership status", body = MembershipStatusResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn membership_status(user_ctx: UserContext) -> Json<MembershipStatusResponse> {
    Json(MembershipStatusResponse {
        status: user_ctx.user.membership_status(),
    })
}

/// Grant premium for a paid checkout and send the confirmation email.
async fn fulfill_checkout(state: &AppState, checkout: &CompletedCheckout) -> Result<(), AppError> {
    if !checkout.is_paid() {
        tracing::info!(session_id = %checkout.id, "Checkout completed without payment; ignoring");
        return Ok(());
    }
    let Some(user_id) = checkout.user_id() else {
        tracing::warn!(session_id = %checkout.id, "Checkout session has no usable client_reference_id");
        return Ok(());
    };

    let Some(user) = state.users.set_premium(user_id).await? else {
        tracing::warn!(user_id = %user_id, "Checkout completed for unknown user");
        return Ok(());
    };
    tracing::info!(user_id = %user.id, session_id = %checkout.id, "Premium membership granted");

    if let Some(email) = &state.email {
        if let Err(e) = email
            .send_premium_confirmation(&user.email, &user.display_name)
            .await
        {
            tracing::error!(error = %e, user_id = %user.id, "Failed to send premium confirmation email");
        }
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/payments/webhook",
    tag = "payments",
    request_body(content = String, content_type = "application/json", description = "Raw Stripe event"),
    responses(
        (status = 200, description = "Event received", body = WebhookAck),
        (status = 400, description = "Invalid signature or payload", body = ErrorResponse)
    )
)]
pub async fn stripe_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, HttpAppError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::InvalidSignature("Missing Stripe-Signature header".to_string()))?;

    verify_webhook_signature(
        &body,
        signature,
        state.config.stripe_webhook_secret(),
        Utc::now().timestamp(),
    )?;

    let event = StripeEvent::parse(&body)?;
    match event.completed_checkout()? {
        Some(checkout) => fulfill_checkout(&state, &checkout).await?,
        None => tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Ignoring Stripe event"),
    }

    Ok(Json(WebhookAck { received: true }))
}

//! Sign-in, session, membership and Stripe webhook integration tests.
//!
//! Run with: `cargo test -p clauseguard-api --test auth_payments_test`

mod helpers;

use axum::http::StatusCode;
use chrono::Utc;
use clauseguard_db::UserStore;
use clauseguard_services::billing::sign_webhook_payload;
use helpers::{setup_test_app, CLIENT_URL, WEBHOOK_SECRET};
use serde_json::{json, Value};
use uuid::Uuid;

fn set_cookies(response: &axum_test::TestResponse) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(String::from)
        .collect()
}

fn location(response: &axum_test::TestResponse) -> String {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("Expected Location header")
        .to_string()
}

#[tokio::test]
async fn test_google_login_sets_state_cookie_and_redirects() {
    let app = setup_test_app().await;

    let response = app.client().get("/auth/google").await;

    response.assert_status(StatusCode::SEE_OTHER);
    let cookies = set_cookies(&response);
    let state_cookie = cookies
        .iter()
        .find(|c| c.starts_with("oauth_state="))
        .expect("oauth_state cookie");
    assert!(state_cookie.contains("HttpOnly"));

    let state = state_cookie
        .trim_start_matches("oauth_state=")
        .split(';')
        .next()
        .unwrap();
    assert_eq!(state.len(), 64);
    assert!(location(&response).ends_with(&format!("state={}", state)));
}

#[tokio::test]
async fn test_google_callback_creates_session() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/auth/google/callback")
        .add_query_param("code", "good-code")
        .add_query_param("state", "abc123")
        .add_header("Cookie", "oauth_state=abc123")
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("{}/dashboard", CLIENT_URL));

    let cookies = set_cookies(&response);
    assert!(cookies
        .iter()
        .any(|c| c.starts_with("oauth_state=;") && c.contains("Max-Age=0")));
    let session = cookies
        .iter()
        .find(|c| c.starts_with("session=") && !c.starts_with("session=;"))
        .expect("session cookie");
    let token = session
        .trim_start_matches("session=")
        .split(';')
        .next()
        .unwrap()
        .to_string();

    // The cookie alone authenticates.
    let response = app
        .client()
        .get("/auth/current-user")
        .add_header("Cookie", format!("session={}", token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["email"], "oauth-user@example.com");
    assert_eq!(body["isPremium"], false);
}

#[tokio::test]
async fn test_google_callback_rejects_state_mismatch() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/auth/google/callback")
        .add_query_param("code", "good-code")
        .add_query_param("state", "forged")
        .add_header("Cookie", "oauth_state=abc123")
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("{}/login", CLIENT_URL));
    assert!(!set_cookies(&response)
        .iter()
        .any(|c| c.starts_with("session=")));
}

#[tokio::test]
async fn test_google_callback_rejects_bad_code() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/auth/google/callback")
        .add_query_param("code", "expired-code")
        .add_query_param("state", "abc123")
        .add_header("Cookie", "oauth_state=abc123")
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("{}/login", CLIENT_URL));
}

#[tokio::test]
async fn test_current_user_requires_session() {
    let app = setup_test_app().await;

    let response = app.client().get("/auth/current-user").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_session_for_deleted_user_rejected() {
    let app = setup_test_app().await;
    let token = clauseguard_api::auth::session::issue_token(
        Uuid::new_v4(),
        helpers::JWT_SECRET,
        1,
    )
    .unwrap();

    let response = app
        .client()
        .get("/auth/current-user")
        .add_header("Authorization", format!("Bearer {}", token))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_session_cookie() {
    let app = setup_test_app().await;

    let response = app.client().post("/auth/logout").await;

    response.assert_status(StatusCode::NO_CONTENT);
    let cookies = set_cookies(&response);
    assert!(cookies
        .iter()
        .any(|c| c.starts_with("session=;") && c.contains("Max-Age=0")));
}

#[tokio::test]
async fn test_membership_status_and_checkout() {
    let app = setup_test_app().await;
    let user = app.sign_in("alice").await;

    let response = app
        .client()
        .get("/payments/membership-status")
        .add_header("Authorization", user.bearer())
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "inactive");

    let response = app
        .client()
        .get("/payments/create-checkout-session")
        .add_header("Authorization", user.bearer())
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["sessionId"], "cs_test_123");

    let requests = app.payments.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].user_id, user.user.id);
    assert_eq!(requests[0].amount_cents, 1000);
    assert_eq!(
        requests[0].success_url,
        format!("{}/payment-success", CLIENT_URL)
    );
}

#[tokio::test]
async fn test_premium_user_cannot_checkout_again() {
    let app = setup_test_app().await;
    let user = app.sign_in("alice").await;
    app.users.set_premium(user.user.id).await.unwrap();

    let response = app
        .client()
        .get("/payments/create-checkout-session")
        .add_header("Authorization", user.bearer())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(app.payments.requests.lock().unwrap().is_empty());
}

fn completed_checkout_event(user_id: Uuid) -> String {
    json!({
        "id": "evt_test_1",
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_test_123",
                "client_reference_id": user_id.to_string(),
                "payment_status": "paid"
            }
        }
    })
    .to_string()
}

#[tokio::test]
async fn test_webhook_grants_premium() {
    let app = setup_test_app().await;
    let user = app.sign_in("alice").await;
    let payload = completed_checkout_event(user.user.id);
    let signature = sign_webhook_payload(payload.as_bytes(), WEBHOOK_SECRET, Utc::now().timestamp());

    let response = app
        .client()
        .post("/payments/webhook")
        .add_header("Stripe-Signature", signature)
        .text(payload)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["received"], true);

    let updated = app.users.get(user.user.id).await.unwrap().unwrap();
    assert!(updated.is_premium);

    let response = app
        .client()
        .get("/payments/membership-status")
        .add_header("Authorization", user.bearer())
        .await;
    let body: Value = response.json();
    assert_eq!(body["status"], "active");
}

#[tokio::test]
async fn test_webhook_rejects_bad_signature() {
    let app = setup_test_app().await;
    let user = app.sign_in("alice").await;
    let payload = completed_checkout_event(user.user.id);
    let signature = sign_webhook_payload(
        payload.as_bytes(),
        "whsec_someone_else",
        Utc::now().timestamp(),
    );

    let response = app
        .client()
        .post("/payments/webhook")
        .add_header("Stripe-Signature", signature)
        .text(payload.clone())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_SIGNATURE");

    let response = app.client().post("/payments/webhook").text(payload).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let unchanged = app.users.get(user.user.id).await.unwrap().unwrap();
    assert!(!unchanged.is_premium);
}

#[tokio::test]
async fn test_webhook_acknowledges_other_events() {
    let app = setup_test_app().await;
    let payload = json!({
        "id": "evt_test_2",
        "type": "customer.created",
        "data": { "object": { "id": "cus_1" } }
    })
    .to_string();
    let signature = sign_webhook_payload(payload.as_bytes(), WEBHOOK_SECRET, Utc::now().timestamp());

    let response = app
        .client()
        .post("/payments/webhook")
        .add_header("Stripe-Signature", signature)
        .text(payload)
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_health_and_liveness() {
    let app = setup_test_app().await;

    let response = app.client().get("/live").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "alive");

    let response = app.client().get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "healthy");
    assert_eq!(body["cache"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/live")
        .add_header("X-Request-ID", "req-42")
        .await;
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-42")
    );

    let response = app.client().get("/live").await;
    assert!(response.headers().get("x-request-id").is_some());
}

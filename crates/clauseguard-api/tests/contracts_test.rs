//! Contract upload, analysis and retrieval integration tests.
//!
//! Run with: `cargo test -p clauseguard-api --test contracts_test`

mod helpers;

use axum::http::StatusCode;
use clauseguard_cache::keys::contract_key;
use clauseguard_db::AnalysisStore;
use helpers::fixtures::{analyze_form, detect_form, text_file_form, type_only_form};
use helpers::{
    setup_test_app, setup_test_app_with, setup_test_app_with_failing_ai, stub_outcome,
    DETECTED_TYPE, STUB_MODEL, STUB_SCORE,
};
use serde_json::Value;
use std::sync::atomic::Ordering;
use uuid::Uuid;

#[tokio::test]
async fn test_detect_type_returns_label_and_clears_upload() {
    let app = setup_test_app().await;
    let user = app.sign_in("alice").await;

    let response = app
        .client()
        .post("/contracts/detect-type")
        .add_header("Authorization", user.bearer())
        .multipart(detect_form())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["detectedType"], DETECTED_TYPE);
    assert!(app.staged_uploads(user.user.id).await.is_empty());
}

#[tokio::test]
async fn test_detect_type_failure_leaves_upload_to_expire() {
    let app = setup_test_app_with(true).await;
    let user = app.sign_in("alice").await;

    let response = app
        .client()
        .post("/contracts/detect-type")
        .add_header("Authorization", user.bearer())
        .multipart(detect_form())
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "DETECTION_FAILED");

    let staged = app.staged_uploads(user.user.id).await;
    assert_eq!(staged.len(), 1);
    assert!(app.cache.ttl(&staged[0]).await.is_some());
}

#[tokio::test]
async fn test_non_pdf_rejected_before_staging() {
    let app = setup_test_app().await;
    let user = app.sign_in("alice").await;

    let response = app
        .client()
        .post("/contracts/detect-type")
        .add_header("Authorization", user.bearer())
        .multipart(text_file_form())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Only PDF files are allowed");
    assert!(app.cache.keys_with_prefix("file:").await.is_empty());
    assert_eq!(app.extractor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_analyze_persists_record_for_caller() {
    let app = setup_test_app().await;
    let user = app.sign_in("alice").await;

    let response = app
        .client()
        .post("/contracts/analyze")
        .add_header("Authorization", user.bearer())
        .multipart(analyze_form("NDA"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["overallScore"], STUB_SCORE);
    assert_eq!(body["contractType"], "NDA");
    assert_eq!(body["userId"], user.user.id.to_string());
    assert_eq!(body["aiModel"], STUB_MODEL);

    let expected = stub_outcome();
    assert_eq!(body["risks"], serde_json::to_value(&expected.risks).unwrap());
    assert_eq!(
        body["opportunities"],
        serde_json::to_value(&expected.opportunities).unwrap()
    );

    let stored = app.analyses.list_for_user(user.user.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].overall_score, STUB_SCORE);
    assert_eq!(stored[0].risks, expected.risks);
    assert_eq!(stored[0].opportunities, expected.opportunities);
}

#[tokio::test]
async fn test_upload_without_file_is_rejected() {
    let app = setup_test_app().await;
    let user = app.sign_in("alice").await;

    for path in ["/contracts/detect-type", "/contracts/analyze"] {
        let response = app
            .client()
            .post(path)
            .add_header("Authorization", user.bearer())
            .multipart(type_only_form("NDA"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "No file uploaded");
    }

    assert!(app.cache.keys_with_prefix("file:").await.is_empty());
    assert_eq!(app.extractor.calls.load(Ordering::SeqCst), 0);
    assert!(app.analyses.is_empty().await);
}

#[tokio::test]
async fn test_analyze_model_failure_saves_nothing() {
    let app = setup_test_app_with_failing_ai().await;
    let user = app.sign_in("alice").await;

    let response = app
        .client()
        .post("/contracts/analyze")
        .add_header("Authorization", user.bearer())
        .multipart(analyze_form("NDA"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "ANALYSIS_FAILED");
    assert_eq!(body["error"], "Failed to analyze contract");
    assert!(!response.text().contains("stub model"));
    assert_eq!(app.extractor.calls.load(Ordering::SeqCst), 1);
    assert!(app.analyses.is_empty().await);
}

#[tokio::test]
async fn test_analyze_extraction_failure_saves_nothing() {
    let app = setup_test_app_with(true).await;
    let user = app.sign_in("alice").await;

    let response = app
        .client()
        .post("/contracts/analyze")
        .add_header("Authorization", user.bearer())
        .multipart(analyze_form("NDA"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "ANALYSIS_FAILED");
    assert_eq!(body["error"], "Failed to analyze contract");
    assert!(app.analyses.is_empty().await);
}

#[tokio::test]
async fn test_analyze_without_type_persists_nothing() {
    let app = setup_test_app().await;
    let user = app.sign_in("alice").await;

    let response = app
        .client()
        .post("/contracts/analyze")
        .add_header("Authorization", user.bearer())
        .multipart(analyze_form("   "))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(app.analyses.is_empty().await);
    assert_eq!(app.extractor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_contract_routes_require_session() {
    let app = setup_test_app().await;

    let response = app.client().get("/contracts/user-contracts").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = app
        .client()
        .post("/contracts/detect-type")
        .multipart(detect_form())
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert!(app.cache.keys_with_prefix("file:").await.is_empty());

    let response = app
        .client()
        .get("/contracts/user-contracts")
        .add_header("Authorization", "Bearer not-a-token")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

async fn analyze_as(app: &helpers::TestApp, user: &helpers::TestUser, contract_type: &str) -> Uuid {
    let response = app
        .client()
        .post("/contracts/analyze")
        .add_header("Authorization", user.bearer())
        .multipart(analyze_form(contract_type))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    Uuid::parse_str(body["id"].as_str().expect("id in analyze response")).expect("valid id")
}

#[tokio::test]
async fn test_list_returns_only_own_contracts() {
    let app = setup_test_app().await;
    let alice = app.sign_in("alice").await;
    let bob = app.sign_in("bob").await;

    analyze_as(&app, &alice, "NDA").await;
    analyze_as(&app, &alice, "Lease").await;
    analyze_as(&app, &bob, "Employment").await;

    let response = app
        .client()
        .get("/contracts/user-contracts")
        .add_header("Authorization", alice.bearer())
        .await;
    response.assert_status_ok();
    let body: Vec<Value> = response.json();
    assert_eq!(body.len(), 2);
    assert!(body
        .iter()
        .all(|c| c["userId"] == alice.user.id.to_string()));

    // newest first
    assert_eq!(body[0]["contractType"], "Lease");
    assert_eq!(body[1]["contractType"], "NDA");
    let newest = body[0]["createdAt"].as_str().unwrap();
    let oldest = body[1]["createdAt"].as_str().unwrap();
    assert!(
        chrono::DateTime::parse_from_rfc3339(newest).unwrap()
            >= chrono::DateTime::parse_from_rfc3339(oldest).unwrap()
    );
}

#[tokio::test]
async fn test_get_contract_is_read_through_and_byte_identical() {
    let app = setup_test_app().await;
    let user = app.sign_in("alice").await;
    let id = analyze_as(&app, &user, "NDA").await;
    let key = contract_key(user.user.id, id);
    assert!(app.cache.ttl(&key).await.is_none());

    let first = app
        .client()
        .get(&format!("/contracts/{}", id))
        .add_header("Authorization", user.bearer())
        .await;
    first.assert_status_ok();
    assert!(app.cache.ttl(&key).await.is_some());

    let second = app
        .client()
        .get(&format!("/contracts/{}", id))
        .add_header("Authorization", user.bearer())
        .await;
    second.assert_status_ok();

    assert_eq!(first.as_bytes(), second.as_bytes());
    let body: Value = second.json();
    assert_eq!(body["id"], id.to_string());
}

#[tokio::test]
async fn test_get_contract_of_other_user_is_not_found() {
    let app = setup_test_app().await;
    let alice = app.sign_in("alice").await;
    let mallory = app.sign_in("mallory").await;
    let id = analyze_as(&app, &alice, "NDA").await;

    // Warm the owner's cache entry first.
    app.client()
        .get(&format!("/contracts/{}", id))
        .add_header("Authorization", alice.bearer())
        .await
        .assert_status_ok();

    let response = app
        .client()
        .get(&format!("/contracts/{}", id))
        .add_header("Authorization", mallory.bearer())
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "Contract not found");

    let response = app
        .client()
        .delete(&format!("/contracts/{}", id))
        .add_header("Authorization", mallory.bearer())
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(app.analyses.len().await, 1);
}

#[tokio::test]
async fn test_get_contract_with_invalid_id() {
    let app = setup_test_app().await;
    let user = app.sign_in("alice").await;

    let response = app
        .client()
        .get("/contracts/not-a-uuid")
        .add_header("Authorization", user.bearer())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .client()
        .get(&format!("/contracts/{}", Uuid::new_v4()))
        .add_header("Authorization", user.bearer())
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_contract_evicts_cache() {
    let app = setup_test_app().await;
    let user = app.sign_in("alice").await;
    let id = analyze_as(&app, &user, "NDA").await;
    let key = contract_key(user.user.id, id);

    app.client()
        .get(&format!("/contracts/{}", id))
        .add_header("Authorization", user.bearer())
        .await
        .assert_status_ok();
    assert!(app.cache.ttl(&key).await.is_some());

    let response = app
        .client()
        .delete(&format!("/contracts/{}", id))
        .add_header("Authorization", user.bearer())
        .await;
    response.assert_status(StatusCode::NO_CONTENT);
    assert!(app.cache.ttl(&key).await.is_none());
    assert!(app.analyses.is_empty().await);

    let response = app
        .client()
        .get(&format!("/contracts/{}", id))
        .add_header("Authorization", user.bearer())
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

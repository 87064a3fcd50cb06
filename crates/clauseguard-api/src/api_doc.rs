//! OpenAPI documentation, served as JSON and through RapiDoc at `/docs`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use clauseguard_core::models;

struct SessionAuth;

impl Modify for SessionAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("session"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ClauseGuard API",
        version = "0.1.0",
        description = "Contract analysis API: upload a PDF contract, detect its type, analyze risks and opportunities, and retrieve stored analyses."
    ),
    paths(
        // Contracts
        handlers::contracts::detect_contract_type,
        handlers::contracts::analyze_contract,
        handlers::contracts::list_user_contracts,
        handlers::contracts::get_contract,
        handlers::contracts::delete_contract,
        // Auth
        handlers::auth::google_login,
        handlers::auth::google_callback,
        handlers::auth::current_user,
        handlers::auth::logout,
        // Payments
        handlers::payments::create_checkout_session,
        handlers::payments::membership_status,
        handlers::payments::stripe_webhook,
        // Health
        handlers::health::health_check,
        handlers::health::liveness_check,
    ),
    components(schemas(
        error::ErrorResponse,
        models::ContractAnalysis,
        models::RiskItem,
        models::OpportunityItem,
        models::Level,
        models::User,
        models::MembershipStatus,
        models::MembershipStatusResponse,
        handlers::contracts::DetectTypeResponse,
        handlers::payments::CheckoutSessionResponse,
        handlers::payments::WebhookAck,
        handlers::health::HealthCheckResponse,
    )),
    modifiers(&SessionAuth),
    tags(
        (name = "contracts", description = "Contract upload, analysis and retrieval"),
        (name = "auth", description = "Google sign-in and sessions"),
        (name = "payments", description = "Premium membership via Stripe"),
        (name = "health", description = "Liveness and dependency checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_contract_routes() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/contracts/detect-type"));
        assert!(spec.paths.paths.contains_key("/contracts/{id}"));
        assert!(spec.paths.paths.contains_key("/payments/webhook"));
    }
}

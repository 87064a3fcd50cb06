use crate::auth::models::UserContext;
use crate::auth::session::{extract_token, verify_token};
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use clauseguard_core::AppError;
use clauseguard_db::UserStore;
use std::sync::Arc;
use subtle::ConstantTimeEq;

#[derive(Clone)]
pub struct AuthState {
    pub jwt_secret: String,
    pub users: Arc<dyn UserStore>,
}

/// Constant-time string equality.
pub(crate) fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Resolve the session token to a user and attach a [`UserContext`] to the request.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match extract_token(request.headers()) {
        Some(token) => token.to_string(),
        None => {
            tracing::debug!("Request without session token");
            return HttpAppError(AppError::Unauthorized("Not authenticated".to_string()))
                .into_response();
        }
    };

    let claims = match verify_token(&token, &auth_state.jwt_secret) {
        Ok(claims) => claims,
        Err(e) => return HttpAppError(e).into_response(),
    };

    let user = match auth_state.users.get(claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!(user_id = %claims.sub, "Session token for unknown user");
            return HttpAppError(AppError::Unauthorized("Not authenticated".to_string()))
                .into_response();
        }
        Err(e) => return HttpAppError(e).into_response(),
    };

    request.extensions_mut().insert(UserContext { user });
    next.run(request).await
}

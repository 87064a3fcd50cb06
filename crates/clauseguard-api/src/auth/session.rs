//! Session tokens and cookies.
//!
//! A session is an HS256 JWT whose subject is the user id. Browsers carry it
//! in the HttpOnly `session` cookie; other clients send it as a Bearer token.

use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use clauseguard_core::constants::SESSION_COOKIE;
use clauseguard_core::AppError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid, // user_id
    pub exp: i64,
    pub iat: i64,
}

/// Sign a session token for `user_id`, valid for `expiry_hours`.
pub fn issue_token(user_id: Uuid, secret: &str, expiry_hours: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: user_id,
        iat: now.timestamp(),
        exp: (now + Duration::hours(expiry_hours)).timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
}

pub fn verify_token(token: &str, secret: &str) -> Result<SessionClaims, AppError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::Unauthorized("Session expired".to_string()),
        _ => AppError::Unauthorized("Invalid session token".to_string()),
    })
}

/// The session token from `Authorization: Bearer` or, failing that, the session cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    bearer.or_else(|| read_cookie(headers, SESSION_COOKIE))
}

/// Value of the cookie `name`, searching every `Cookie` header.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value for an HttpOnly cookie scoped to the whole site.
pub fn build_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, value, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes `name`.
pub fn expired_cookie(name: &str, secure: bool) -> String {
    build_cookie(name, "", 0, secure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

    #[test]
    fn token_round_trips_subject() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, SECRET, 1).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_with_wrong_secret_rejected() {
        let token = issue_token(Uuid::new_v4(), SECRET, 1).unwrap();
        let err = verify_token(&token, "another-secret-that-is-also-32-chars-long").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn expired_token_rejected() {
        let token = issue_token(Uuid::new_v4(), SECRET, -2).unwrap();
        match verify_token(&token, SECRET) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Session expired"),
            other => panic!("expected expired session, got {:?}", other),
        }
    }

    #[test]
    fn bearer_preferred_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("session=def"));
        assert_eq!(extract_token(&headers), Some("abc"));

        headers.remove(header::AUTHORIZATION);
        assert_eq!(extract_token(&headers), Some("def"));
    }

    #[test]
    fn cookie_lookup_handles_multiple_pairs() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; oauth_state=xyz; session=tok"),
        );
        assert_eq!(read_cookie(&headers, "oauth_state"), Some("xyz"));
        assert_eq!(read_cookie(&headers, "session"), Some("tok"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn cookies_are_http_only() {
        let cookie = build_cookie("session", "tok", 3600, true);
        assert!(cookie.starts_with("session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("; Secure"));
        assert!(expired_cookie("session", false).contains("Max-Age=0"));
    }
}

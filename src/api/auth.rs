//! Registration, login and the bearer-token middleware.
//!
//! - `POST /cadastre` creates an account
//! - `POST /auth/login` verifies credentials and returns a JWT
//! - When `DEV_MODE=false` and `JWT_SECRET` is set, `/tarefas` endpoints
//!   require `Authorization: Bearer <jwt>`
//!
//! # Security notes
//! - Intentionally minimal: single shared secret, no refresh/rotation.
//! - Use a strong `JWT_SECRET` in production.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};

use super::routes::AppState;
use super::types::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Claims {
    /// Subject: the account email
    sub: String,
    /// Issued-at unix seconds
    iat: i64,
    /// Expiration unix seconds
    exp: i64,
}

fn issue_jwt(secret: &str, email: &str, ttl_days: i64) -> anyhow::Result<(String, i64)> {
    let now = Utc::now();
    let exp = now + Duration::days(ttl_days.max(1));
    let claims = Claims {
        sub: email.to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };
    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, claims.exp))
}

fn verify_jwt(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let validation = Validation::default();
    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

/// POST /cadastre - Register an account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, (StatusCode, String)> {
    let account = state
        .accounts
        .register(&req.email, &req.nome, &req.senha)
        .await
        .map_err(super::account_error)?;
    Ok(Json(RegisterResponse {
        email: account.email,
        nome: account.name,
    }))
}

/// POST /auth/login - Verify credentials and issue a token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, String)> {
    let account = state
        .accounts
        .verify_credentials(&req.email, &req.senha)
        .await
        .map_err(super::account_error)?;

    let secret = state.config.auth.jwt_secret.as_deref().ok_or_else(|| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "JWT_SECRET not configured".to_string(),
        )
    })?;

    let (token, exp) = issue_jwt(secret, &account.email, state.config.auth.jwt_ttl_days)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(LoginResponse { token, exp }))
}

/// Bearer-token middleware for `/tarefas`.
///
/// Requests pass straight through when auth is not required (dev mode, or
/// no `JWT_SECRET` configured - the original app ran entirely open).
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !state.config.auth_required() {
        return next.run(req).await;
    }

    // auth_required() implies the secret is present.
    let secret = match state.config.auth.jwt_secret.as_deref() {
        Some(s) => s,
        None => return next.run(req).await,
    };

    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    let token = auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .unwrap_or("");

    if token.is_empty() {
        return (StatusCode::UNAUTHORIZED, "Missing Authorization header").into_response();
    }

    match verify_jwt(token, secret) {
        Ok(_claims) => next.run(req).await,
        Err(_) => (StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify_and_carry_the_email() {
        let (token, exp) = issue_jwt("secret", "ana@example.com", 30).unwrap();
        assert!(exp > Utc::now().timestamp());

        let claims = verify_jwt(&token, "secret").unwrap();
        assert_eq!(claims.sub, "ana@example.com");

        assert!(verify_jwt(&token, "other-secret").is_err());
    }

    #[test]
    fn ttl_is_clamped_to_at_least_one_day() {
        let (_, exp) = issue_jwt("secret", "a@b.co", 0).unwrap();
        assert!(exp >= (Utc::now() + Duration::days(1)).timestamp() - 5);
    }
}

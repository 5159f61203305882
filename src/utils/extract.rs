use async_trait::async_trait;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::state::AppState;
use crate::utils::error::AppError;

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// `Json` whose rejections use the API error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Admin access. Open when no `ADMIN_TOKEN` is configured.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

/// Compares secrets in constant time.
fn secret_matches(provided: &str, expected: &str) -> bool {
    constant_time_eq::constant_time_eq(provided.as_bytes(), expected.as_bytes())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

#[async_trait]
impl FromRequestParts<AppState> for AdminAccess {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.admin_token.as_deref() else {
            return Ok(AdminAccess);
        };

        match bearer_token(&parts.headers) {
            Some(token) if secret_matches(token, expected) => Ok(AdminAccess),
            Some(_) => Err(AppError::AuthError("Jeton administrateur invalide".to_string())),
            None => Err(AppError::AuthError(
                "Authentification administrateur requise".to_string(),
            )),
        }
    }
}

/// Shared-secret check for payment provider callbacks. Open when no
/// `MOBILE_MONEY_WEBHOOK_SECRET` is configured.
#[derive(Debug, Clone, Copy)]
pub struct WebhookAuth;

#[async_trait]
impl FromRequestParts<AppState> for WebhookAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.webhook_secret.as_deref() else {
            return Ok(WebhookAuth);
        };

        let provided = parts
            .headers
            .get(WEBHOOK_SECRET_HEADER)
            .and_then(|v| v.to_str().ok());
        if provided.is_some_and(|secret| secret_matches(secret, expected)) {
            Ok(WebhookAuth)
        } else {
            Err(AppError::AuthError("Signature webhook invalide".to_string()))
        }
    }
}

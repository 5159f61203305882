use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;
use crate::utils::response::success;

pub mod admin;
pub mod events;
pub mod payments;
pub mod promos;
pub mod tickets;

#[derive(Serialize)]
struct LivenessPayload {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// Process liveness; never touches storage.
pub async fn liveness() -> Response {
    success(LivenessPayload {
        status: "ok",
        service: "billetterie-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
}

/// Storage connectivity probe used by clients to decide whether to fall
/// back to their offline copy.
pub async fn health_check(State(state): State<AppState>) -> Response {
    match state.store.ping().await {
        Ok(()) => success(HealthPayload {
            status: "ok",
            message: "API and database working correctly",
            timestamp: Some(Utc::now()),
        }),
        Err(e) => {
            tracing::error!(error = ?e, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthPayload {
                    status: "error",
                    message: "Database connection failed",
                    timestamp: None,
                }),
            )
                .into_response()
        }
    }
}

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::services::lifecycle::Settlement;
use crate::services::mobile_money::PaymentRequest;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::{ApiJson, WebhookAuth};
use crate::utils::response::success;

pub const WEBHOOK_SUCCESS: &str = "SUCCESS";

pub async fn simulate_mobile_money(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PaymentRequest>,
) -> Response {
    let outcome = state.mobile_money.charge(&request).await;
    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(outcome)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct MobileMoneyWebhook {
    #[serde(rename = "transactionId", default)]
    pub transaction_id: Option<String>,
    pub status: String,
    #[serde(rename = "ticketId")]
    pub ticket_id: String,
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Serialize)]
struct WebhookAck {
    success: bool,
}

pub async fn mobile_money_webhook(
    _auth: WebhookAuth,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<MobileMoneyWebhook>,
) -> Result<Response, AppError> {
    if payload.status != WEBHOOK_SUCCESS {
        tracing::warn!(
            ticket_id = %payload.ticket_id,
            status = %payload.status,
            "Mobile money webhook reported a failed payment"
        );
        return Err(AppError::ValidationError("Transaction échouée".to_string()));
    }

    let settlement = Settlement::PaymentConfirmed {
        reference: payload.transaction_id,
        provider: payload.provider,
    };
    let ticket = state
        .store
        .settle_ticket(&payload.ticket_id, &settlement)
        .await?;

    tracing::info!(
        ticket_id = %ticket.id,
        status = %ticket.status,
        "Mobile money payment confirmed by webhook"
    );

    Ok(success(WebhookAck { success: true }))
}

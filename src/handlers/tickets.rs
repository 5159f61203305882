use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::models::{Ticket, TicketStatus, Transaction};
use crate::services::issuance::{self, TicketRequest};
use crate::services::lifecycle::{Settlement, ValidationAction};
use crate::services::verification::{self, Verification, VerifyRequest, VerifyResponse};
use crate::state::AppState;
use crate::store::{ticket_not_found, TicketLookup};
use crate::utils::error::AppError;
use crate::utils::extract::{AdminAccess, ApiJson};
use crate::utils::response::{created, success};

pub async fn create_ticket(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TicketRequest>,
) -> Result<Response, AppError> {
    let issued = issuance::issue_ticket(state.store.as_ref(), request).await?;
    Ok(created(issued))
}

#[derive(Debug, Serialize)]
pub struct TicketDetails {
    pub ticket: Ticket,
    pub transaction: Option<Transaction>,
}

pub async fn get_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> Result<Response, AppError> {
    let ticket = state
        .store
        .find_ticket(&TicketLookup::IdOrCode(ticket_id.clone()))
        .await?
        .ok_or_else(|| ticket_not_found(&ticket_id))?;
    let transaction = state.store.find_transaction(&ticket.id).await?;

    Ok(success(TicketDetails {
        ticket,
        transaction,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ValidateTicketRequest {
    pub action: ValidationAction,
}

#[derive(Debug, Serialize)]
pub struct ValidateTicketResponse {
    pub success: bool,
    #[serde(rename = "statut")]
    pub status: TicketStatus,
}

pub async fn validate_ticket(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
    ApiJson(request): ApiJson<ValidateTicketRequest>,
) -> Result<Response, AppError> {
    let ticket = state
        .store
        .settle_ticket(&ticket_id, &Settlement::Admin(request.action))
        .await?;

    tracing::info!(
        ticket_id = %ticket.id,
        action = ?request.action,
        status = %ticket.status,
        "Ticket validated by admin"
    );

    Ok(success(ValidateTicketResponse {
        success: true,
        status: ticket.status,
    }))
}

pub async fn verify_ticket(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<VerifyRequest>,
) -> Result<Response, AppError> {
    let outcome = verification::verify_ticket(state.store.as_ref(), &request).await?;
    let status = match &outcome {
        Verification::Unknown => StatusCode::NOT_FOUND,
        Verification::Granted(ticket) | Verification::Denied(ticket) => {
            tracing::info!(
                ticket_id = %ticket.id,
                status = %ticket.status,
                "Ticket checked at entry"
            );
            StatusCode::OK
        }
    };

    Ok((status, Json(VerifyResponse::from(outcome))).into_response())
}

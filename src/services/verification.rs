use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{PaymentType, Ticket, TicketStatus};
use crate::services::issuance::QrPayload;
use crate::store::{TicketLookup, TicketStore};
use crate::utils::error::AppError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyRequest {
    #[serde(rename = "qrCode", default)]
    pub qr_code: Option<String>,
    #[serde(rename = "ticketId", default)]
    pub ticket_id: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Verification {
    Granted(Ticket),
    Denied(Ticket),
    Unknown,
}

/// What door staff see for a ticket that grants entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntryPass {
    pub id: String,
    #[serde(rename = "nombreBillets")]
    pub ticket_count: i32,
    #[serde(rename = "prixTotal")]
    pub total_price: Decimal,
    #[serde(rename = "typePaiement")]
    pub payment_type: PaymentType,
    #[serde(rename = "dateValidation")]
    pub validated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TicketView {
    Pass(EntryPass),
    Full(Ticket),
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<TicketView>,
    pub message: String,
}

impl From<Verification> for VerifyResponse {
    fn from(outcome: Verification) -> Self {
        match outcome {
            Verification::Granted(ticket) => VerifyResponse {
                valid: true,
                message: format!(
                    "Ticket valide - {} personne(s) - Accès autorisé",
                    ticket.ticket_count
                ),
                ticket: Some(TicketView::Pass(EntryPass {
                    id: ticket.id,
                    ticket_count: ticket.ticket_count,
                    total_price: ticket.total_price,
                    payment_type: ticket.payment_type,
                    validated_at: ticket.validated_at,
                })),
            },
            Verification::Denied(ticket) => VerifyResponse {
                valid: false,
                message: format!("Ticket non confirmé - Statut: {}", ticket.status),
                ticket: Some(TicketView::Full(ticket)),
            },
            Verification::Unknown => VerifyResponse {
                valid: false,
                ticket: None,
                message: "Ticket introuvable".to_string(),
            },
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

async fn find_by_qr(store: &dyn TicketStore, qr: &str) -> Result<Option<Ticket>, AppError> {
    if let Some(ticket) = store.find_ticket(&TicketLookup::QrCode(qr.to_string())).await? {
        return Ok(Some(ticket));
    }
    // Scanners sometimes re-serialize the payload; fall back to its ticket id.
    match QrPayload::decode(qr) {
        Some(payload) => {
            store
                .find_ticket(&TicketLookup::IdOrCode(payload.ticket_id))
                .await
        }
        None => Ok(None),
    }
}

/// Looks a ticket up by QR payload (preferred) or by id / unique code.
pub async fn verify_ticket(
    store: &dyn TicketStore,
    request: &VerifyRequest,
) -> Result<Verification, AppError> {
    let found = if let Some(qr) = present(request.qr_code.as_deref()) {
        find_by_qr(store, qr).await?
    } else if let Some(id) = present(request.ticket_id.as_deref()) {
        store
            .find_ticket(&TicketLookup::IdOrCode(id.to_string()))
            .await?
    } else {
        return Err(AppError::ValidationError(
            "QR Code ou ID ticket requis".to_string(),
        ));
    };

    Ok(match found {
        Some(ticket) if ticket.status == TicketStatus::Confirmed => Verification::Granted(ticket),
        Some(ticket) => Verification::Denied(ticket),
        None => Verification::Unknown,
    })
}

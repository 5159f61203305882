//! Ticket issuance: pricing, identifiers, QR payload and the atomic write.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{PaymentType, Ticket, TicketStatus, Transaction};
use crate::services::{lifecycle, pricing, promo};
use crate::store::{NewTicket, TicketStore, INSUFFICIENT_STOCK_MESSAGE};
use crate::utils::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct TicketRequest {
    #[serde(rename = "eventId")]
    pub event_id: i64,
    #[serde(rename = "nombreBillets")]
    pub ticket_count: i32,
    #[serde(rename = "typePaiement")]
    pub payment_type: PaymentType,
    #[serde(rename = "codePromo", default)]
    pub promo_code: Option<String>,
    /// Accepted for compatibility; the event's own price is authoritative.
    #[serde(rename = "prixUnitaire", default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(rename = "numero", default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedTicket {
    #[serde(rename = "ticketId")]
    pub ticket_id: String,
    #[serde(rename = "codeUnique")]
    pub unique_code: String,
    #[serde(rename = "qrCode")]
    pub qr_code: String,
    #[serde(rename = "prixTotal")]
    pub total_price: Decimal,
    /// Applied discount percentage, 0 when no promo applied.
    pub reduction: i32,
    #[serde(rename = "statut")]
    pub status: TicketStatus,
}

/// Content encoded in the ticket's QR code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    pub ticket_id: String,
    pub event_id: i64,
    pub nombre_billets: i32,
    pub code_unique: String,
    pub timestamp: DateTime<Utc>,
}

impl QrPayload {
    pub fn encode(&self) -> Result<String, AppError> {
        serde_json::to_string(self)
            .map_err(|e| AppError::InternalServerError(format!("QR payload encoding failed: {}", e)))
    }

    pub fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

// UUID v4 carries 122 random bits: ~1e-18 collision odds after a billion ids.
pub fn new_ticket_id() -> String {
    format!("TICKET_{}", Uuid::new_v4().simple())
}

pub fn new_transaction_id() -> String {
    format!("TRANS_{}", Uuid::new_v4().simple())
}

pub fn new_unique_code(event_id: i64) -> String {
    format!("{}-{}", event_id, Uuid::new_v4().simple())
}

/// Resolves an optional promo code to `(code, percentage)`. Codes that are
/// unknown or ineligible are ignored rather than failing the purchase.
async fn resolve_promo(
    store: &dyn TicketStore,
    raw_code: Option<&str>,
    ticket_count: i32,
    today: NaiveDate,
) -> Result<Option<(String, i32)>, AppError> {
    let Some(code) = raw_code.map(promo::normalize_code).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };

    let Some(found) = store.find_promo(&code).await? else {
        tracing::debug!(code = %code, "Unknown promo code ignored");
        return Ok(None);
    };

    match promo::check_eligibility(&found, ticket_count, today) {
        Ok(percentage) => Ok(Some((found.code, percentage))),
        Err(rejection) => {
            tracing::debug!(code = %code, ?rejection, "Ineligible promo code ignored");
            Ok(None)
        }
    }
}

pub async fn issue_ticket(
    store: &dyn TicketStore,
    request: TicketRequest,
) -> Result<IssuedTicket, AppError> {
    if request.ticket_count < 1 {
        return Err(AppError::ValidationError(
            "Le nombre de billets doit être au moins 1".to_string(),
        ));
    }

    let event = store
        .find_event(request.event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Événement {} introuvable", request.event_id)))?;

    if !event.has_stock_for(request.ticket_count) {
        return Err(AppError::Conflict(INSUFFICIENT_STOCK_MESSAGE.to_string()));
    }

    if let Some(client_price) = request.unit_price {
        if client_price != event.unit_price {
            tracing::warn!(
                event_id = event.id,
                %client_price,
                event_price = %event.unit_price,
                "Client unit price differs from event price, using event price"
            );
        }
    }

    let now = Utc::now();
    let applied = resolve_promo(
        store,
        request.promo_code.as_deref(),
        request.ticket_count,
        now.date_naive(),
    )
    .await?;
    let reduction = applied.as_ref().map_or(0, |(_, pct)| *pct);
    let total_price = pricing::total_price(event.unit_price, request.ticket_count, reduction);

    let ticket_id = new_ticket_id();
    let unique_code = new_unique_code(event.id);
    let qr_code = QrPayload {
        ticket_id: ticket_id.clone(),
        event_id: event.id,
        nombre_billets: request.ticket_count,
        code_unique: unique_code.clone(),
        timestamp: now,
    }
    .encode()?;

    let (ticket_status, transaction_status) = lifecycle::initial_status(request.payment_type);
    let confirmed = ticket_status == TicketStatus::Confirmed;
    let promo_code = applied.map(|(code, _)| code);

    let new_ticket = NewTicket {
        ticket: Ticket {
            id: ticket_id.clone(),
            event_id: event.id,
            unique_code,
            qr_code,
            ticket_count: request.ticket_count,
            total_price,
            payment_type: request.payment_type,
            promo_code: promo_code.clone(),
            status: ticket_status,
            created_at: now,
            validated_at: confirmed.then_some(now),
        },
        transaction: Transaction {
            id: new_transaction_id(),
            ticket_id,
            amount: total_price,
            payment_method: request.payment_type,
            status: transaction_status,
            provider: request.provider,
            phone_number: request.phone_number,
            external_reference: None,
            created_at: now,
            completed_at: confirmed.then_some(now),
        },
        consumes_stock: confirmed,
        redeem_promo: promo_code,
    };

    let stored = store.insert_ticket(new_ticket).await?;

    tracing::info!(
        ticket_id = %stored.id,
        event_id = stored.event_id,
        count = stored.ticket_count,
        payment = %stored.payment_type,
        status = %stored.status,
        total = %stored.total_price,
        "Ticket issued"
    );

    Ok(IssuedTicket {
        ticket_id: stored.id,
        unique_code: stored.unique_code,
        qr_code: stored.qr_code,
        total_price: stored.total_price,
        reduction,
        status: stored.status,
    })
}

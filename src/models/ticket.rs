use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Pending,
    Confirmed,
    Rejected,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::Confirmed => "confirmed",
            TicketStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment channel chosen at checkout. Shared by tickets and transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_type", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PaymentType {
    Cash,
    Card,
    MobileMoney,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "cash",
            PaymentType::Card => "card",
            PaymentType::MobileMoney => "mobile-money",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: String,
    pub event_id: i64,
    #[serde(rename = "code_unique")]
    #[sqlx(rename = "code_unique")]
    pub unique_code: String,
    pub qr_code: String,
    #[serde(rename = "nombre_billets")]
    #[sqlx(rename = "nombre_billets")]
    pub ticket_count: i32,
    #[serde(rename = "prix_total")]
    #[sqlx(rename = "prix_total")]
    pub total_price: Decimal,
    #[serde(rename = "type_paiement")]
    #[sqlx(rename = "type_paiement")]
    pub payment_type: PaymentType,
    #[serde(rename = "code_promo")]
    #[sqlx(rename = "code_promo")]
    pub promo_code: Option<String>,
    #[serde(rename = "statut")]
    #[sqlx(rename = "statut")]
    pub status: TicketStatus,
    #[serde(rename = "date_creation")]
    #[sqlx(rename = "date_creation")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "date_validation")]
    #[sqlx(rename = "date_validation")]
    pub validated_at: Option<DateTime<Utc>>,
}

/// Ticket row joined with the name of its event, as listed on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketWithEvent {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub ticket: Ticket,
    pub event_nom: String,
}

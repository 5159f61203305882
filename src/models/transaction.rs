use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use super::ticket::PaymentType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: String,
    pub ticket_id: String,
    #[serde(rename = "montant")]
    #[sqlx(rename = "montant")]
    pub amount: Decimal,
    #[serde(rename = "methode_paiement")]
    #[sqlx(rename = "methode_paiement")]
    pub payment_method: PaymentType,
    #[serde(rename = "statut")]
    #[sqlx(rename = "statut")]
    pub status: TransactionStatus,
    #[serde(rename = "mobile_money_provider")]
    #[sqlx(rename = "mobile_money_provider")]
    pub provider: Option<String>,
    #[serde(rename = "mobile_money_numero")]
    #[sqlx(rename = "mobile_money_numero")]
    pub phone_number: Option<String>,
    #[serde(rename = "reference_externe")]
    #[sqlx(rename = "reference_externe")]
    pub external_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

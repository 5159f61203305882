use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    #[serde(rename = "nom")]
    #[sqlx(rename = "nom")]
    pub name: String,
    #[serde(rename = "date_event")]
    #[sqlx(rename = "date_event")]
    pub event_date: Option<NaiveDate>,
    #[serde(rename = "prix_unitaire")]
    #[sqlx(rename = "prix_unitaire")]
    pub unit_price: Decimal,
    #[serde(rename = "stock_total")]
    #[sqlx(rename = "stock_total")]
    pub total_stock: i32,
    #[serde(rename = "stock_restant")]
    #[sqlx(rename = "stock_restant")]
    pub remaining_stock: i32,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn has_stock_for(&self, count: i32) -> bool {
        self.remaining_stock >= count
    }
}

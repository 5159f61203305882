use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// `max_uses` value meaning the code can be redeemed without limit.
pub const UNLIMITED_USES: i32 = -1;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PromoCode {
    pub code: String,
    #[serde(rename = "pourcentage")]
    #[sqlx(rename = "pourcentage")]
    pub percentage: i32,
    #[serde(rename = "min_billets")]
    #[sqlx(rename = "min_billets")]
    pub min_tickets: i32,
    #[serde(rename = "max_utilisations")]
    #[sqlx(rename = "max_utilisations")]
    pub max_uses: i32,
    #[serde(rename = "utilisations_actuelles")]
    #[sqlx(rename = "utilisations_actuelles")]
    pub use_count: i32,
    #[serde(rename = "actif")]
    #[sqlx(rename = "actif")]
    pub active: bool,
    #[serde(rename = "date_debut")]
    #[sqlx(rename = "date_debut")]
    pub starts_on: Option<NaiveDate>,
    #[serde(rename = "date_fin")]
    #[sqlx(rename = "date_fin")]
    pub ends_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl PromoCode {
    pub fn has_uses_left(&self) -> bool {
        self.max_uses == UNLIMITED_USES || self.use_count < self.max_uses
    }
}

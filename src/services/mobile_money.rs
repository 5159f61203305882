//! Development stand-in for a mobile-money operator.

use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::MobileMoneyConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    pub provider: String,
    #[serde(rename = "montant")]
    pub amount: Decimal,
    #[serde(rename = "numero")]
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentOutcome {
    pub success: bool,
    #[serde(rename = "transactionId", skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub message: String,
    #[serde(rename = "numero", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MobileMoneySimulator {
    config: MobileMoneyConfig,
}

impl MobileMoneySimulator {
    pub fn new(config: MobileMoneyConfig) -> Self {
        Self { config }
    }

    fn draw<R: Rng>(&self, rng: &mut R) -> (Duration, bool) {
        let min = self.config.min_delay.as_millis() as u64;
        let max = self.config.max_delay.as_millis() as u64;
        let delay = if max > min {
            Duration::from_millis(rng.gen_range(min..=max))
        } else {
            self.config.min_delay
        };
        (delay, rng.gen_bool(self.config.success_rate))
    }

    /// Waits a random network-like delay, then approves or declines.
    pub async fn charge(&self, request: &PaymentRequest) -> PaymentOutcome {
        let (delay, approved) = self.draw(&mut rand::thread_rng());
        tokio::time::sleep(delay).await;

        if approved {
            let transaction_id = format!(
                "MM_{}_{}",
                request.provider,
                Utc::now().timestamp_millis()
            );
            tracing::info!(
                provider = %request.provider,
                amount = %request.amount,
                transaction_id = %transaction_id,
                "Simulated mobile money payment approved"
            );
            PaymentOutcome {
                success: true,
                transaction_id: Some(transaction_id),
                message: format!(
                    "Paiement de {} FCFA confirmé via {}",
                    request.amount, request.provider
                ),
                phone_number: Some(request.phone_number.clone()),
            }
        } else {
            tracing::info!(provider = %request.provider, "Simulated mobile money payment declined");
            PaymentOutcome {
                success: false,
                transaction_id: None,
                message: "Échec du paiement Mobile Money".to_string(),
                phone_number: None,
            }
        }
    }
}

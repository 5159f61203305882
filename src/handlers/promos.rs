use axum::extract::State;
use axum::response::Response;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::services::promo::{self, INVALID_PROMO_MESSAGE};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::ApiJson;
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
pub struct ValidatePromoRequest {
    pub code: String,
    #[serde(rename = "nombreBillets")]
    pub ticket_count: i32,
}

#[derive(Debug, Serialize)]
pub struct ValidatePromoResponse {
    pub code: String,
    #[serde(rename = "pourcentage")]
    pub percentage: i32,
    pub valid: bool,
}

pub async fn validate_promo(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ValidatePromoRequest>,
) -> Result<Response, AppError> {
    let code = promo::normalize_code(&request.code);
    let found = state
        .store
        .find_promo(&code)
        .await?
        .ok_or_else(|| AppError::NotFound(INVALID_PROMO_MESSAGE.to_string()))?;

    let percentage =
        promo::check_eligibility(&found, request.ticket_count, Utc::now().date_naive())?;

    Ok(success(ValidatePromoResponse {
        code: found.code,
        percentage,
        valid: true,
    }))
}

use chrono::NaiveDate;

use crate::models::PromoCode;
use crate::utils::error::AppError;

pub const INVALID_PROMO_MESSAGE: &str = "Code promo invalide ou expiré";

/// Why a promo code cannot be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoRejection {
    Inactive,
    NotStarted,
    Expired,
    Exhausted,
    BelowMinimum { min: i32 },
}

impl From<PromoRejection> for AppError {
    fn from(rejection: PromoRejection) -> Self {
        match rejection {
            PromoRejection::BelowMinimum { min } => AppError::PromoMinimumNotMet { min },
            _ => AppError::NotFound(INVALID_PROMO_MESSAGE.to_string()),
        }
    }
}

/// Codes are matched case-insensitively by storing them upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Checks every eligibility rule and returns the discount percentage.
///
/// Availability (active flag, date window, usage cap) is checked before the
/// minimum ticket count, so an expired code is never reported as merely
/// needing more tickets.
pub fn check_eligibility(
    promo: &PromoCode,
    ticket_count: i32,
    today: NaiveDate,
) -> Result<i32, PromoRejection> {
    if !promo.active {
        return Err(PromoRejection::Inactive);
    }
    if promo.starts_on.is_some_and(|start| start > today) {
        return Err(PromoRejection::NotStarted);
    }
    if promo.ends_on.is_some_and(|end| end < today) {
        return Err(PromoRejection::Expired);
    }
    if !promo.has_uses_left() {
        return Err(PromoRejection::Exhausted);
    }
    if ticket_count < promo.min_tickets {
        return Err(PromoRejection::BelowMinimum {
            min: promo.min_tickets,
        });
    }
    Ok(promo.percentage)
}

use rust_decimal::{Decimal, RoundingStrategy};

/// Total for `count` tickets at `unit_price`, less `percentage` percent.
///
/// Amounts are FCFA. For whole-franc prices the result is exactly
/// `unit_price * count * (100 - percentage) / 100`. Sub-franc results are
/// rounded to two places (midpoint away from zero), the scale of the
/// `NUMERIC(12,2)` `prix_total` and `montant` columns.
pub fn total_price(unit_price: Decimal, count: i32, percentage: i32) -> Decimal {
    let gross = unit_price * Decimal::from(count);
    if percentage == 0 {
        return gross;
    }

    let kept = Decimal::from(100 - percentage);
    (gross * kept / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

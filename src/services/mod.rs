pub mod issuance;
pub mod lifecycle;
pub mod mobile_money;
pub mod pricing;
pub mod promo;
pub mod verification;

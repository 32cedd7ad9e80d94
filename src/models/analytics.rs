use rust_decimal::Decimal;
use serde::Serialize;

/// Aggregate redemption figures over every coupon in the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CouponAnalytics {
    pub total_coupons: u64,
    pub used_coupons: u64,
    pub expired_coupons: u64,
    pub active_coupons: u64,
    pub inactive_coupons: u64,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total_value: Decimal,
    pub gift_coupons: u64,
    pub referral_coupons: u64,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub gift_redemption_rate: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub referral_redemption_rate: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub overall_redemption_rate: Decimal,
}

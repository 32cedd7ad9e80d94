use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The most recent order that consumed a coupon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEntry {
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default, serialize_with = "rust_decimal::serde::float::serialize")]
    pub discount_amount: Decimal,
    pub used_at: DateTime<Utc>,
}

/// Running redemption tally for one coupon code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponUsage {
    pub coupon_code: String,
    pub usage_count: i64,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total_discount: Decimal,
    pub last_used: DateTime<Utc>,
    #[serde(default)]
    pub orders_data: Option<UsageEntry>,
}

impl CouponUsage {
    pub fn first(coupon_code: &str, entry: UsageEntry) -> Self {
        Self {
            coupon_code: coupon_code.to_string(),
            usage_count: 1,
            total_discount: entry.discount_amount,
            last_used: entry.used_at,
            orders_data: Some(entry),
        }
    }

    pub fn record(&mut self, entry: UsageEntry) {
        self.usage_count += 1;
        self.total_discount += entry.discount_amount;
        self.last_used = entry.used_at;
        self.orders_data = Some(entry);
    }
}

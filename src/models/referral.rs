use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::coupon::{Coupon, DiscountKind};

/// Link between a referrer, a referee and the coupon issued to the referee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    pub id: Uuid,
    pub referrer_email: String,
    pub referee_email: String,
    #[serde(default)]
    pub coupon_id: Option<Uuid>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub discount_applied: Decimal,
    pub discount_type: DiscountKind,
    #[serde(default)]
    pub referrer_gets_reward: bool,
    #[serde(default)]
    pub referrer_reward_coupon_id: Option<Uuid>,
    #[serde(default, serialize_with = "rust_decimal::serde::float_option::serialize")]
    pub referrer_reward_value: Option<Decimal>,
    #[serde(default)]
    pub redeemed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_discount_kind() -> DiscountKind {
    DiscountKind::FixedAmount
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferralCouponRequest {
    pub referrer_email: String,
    pub referee_email: String,
    pub discount_value: Decimal,
    #[serde(default = "default_discount_kind")]
    pub discount_type: DiscountKind,
    #[serde(default)]
    pub referrer_gets_reward: bool,
    pub referrer_reward_value: Option<Decimal>,
    pub notes: Option<String>,
}

impl ReferralCouponRequest {
    pub fn new(referrer_email: &str, referee_email: &str, discount_value: Decimal) -> Self {
        Self {
            referrer_email: referrer_email.to_string(),
            referee_email: referee_email.to_string(),
            discount_value,
            discount_type: DiscountKind::FixedAmount,
            referrer_gets_reward: false,
            referrer_reward_value: None,
            notes: None,
        }
    }

    pub fn with_reward(mut self, value: Decimal) -> Self {
        self.referrer_gets_reward = true;
        self.referrer_reward_value = Some(value);
        self
    }
}

/// Everything written by one referral: the referee coupon, the optional
/// reward coupon and the linking record.
#[derive(Debug, Clone, Serialize)]
pub struct ReferralCoupons {
    pub referee_coupon: Coupon,
    pub referrer_coupon: Option<Coupon>,
    pub referral: Referral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferralRole {
    Referrer,
    Referee,
}

impl ReferralRole {
    pub fn column(&self) -> &'static str {
        match self {
            ReferralRole::Referrer => "referrer_email",
            ReferralRole::Referee => "referee_email",
        }
    }
}

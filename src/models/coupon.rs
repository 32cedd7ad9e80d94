use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    errors::ValidationErrors,
    utils::{email::normalize_email, expiry::parse_expiry},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscountKind {
    #[serde(rename = "percentage")]
    Percentage,
    #[serde(rename = "fixed_amount", alias = "fixed")]
    FixedAmount,
    #[serde(rename = "minimum_spend")]
    MinimumSpend,
}

impl DiscountKind {
    /// Symbol used in generated coupon names.
    pub fn unit_symbol(&self) -> &'static str {
        match self {
            DiscountKind::Percentage => "%",
            DiscountKind::FixedAmount | DiscountKind::MinimumSpend => "$",
        }
    }
}

impl std::fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountKind::Percentage => write!(f, "percentage"),
            DiscountKind::FixedAmount => write!(f, "fixed_amount"),
            DiscountKind::MinimumSpend => write!(f, "minimum_spend"),
        }
    }
}

impl FromStr for DiscountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "percentage" => Ok(DiscountKind::Percentage),
            "fixed_amount" | "fixed" => Ok(DiscountKind::FixedAmount),
            "minimum_spend" => Ok(DiscountKind::MinimumSpend),
            _ => Err(format!("Invalid discount type: {}", s)),
        }
    }
}

/// Expiry instant exactly as the store holds it.
///
/// Kept as text so that a malformed value read back from the store never
/// fails decoding; an unparseable expiry counts as "not expired".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpiryDate(pub String);

impl ExpiryDate {
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        ExpiryDate(instant.to_rfc3339())
    }

    pub fn from(input: &str) -> Result<Self, String> {
        match parse_expiry(input) {
            Some(instant) => Ok(Self::from_instant(instant)),
            None => Err(format!("Invalid expiry date: {}", input)),
        }
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        parse_expiry(&self.0)
    }

    pub fn has_passed(&self, now: DateTime<Utc>) -> bool {
        self.instant().map_or(false, |expiry| expiry <= now)
    }
}

/// Where a coupon stands, derived from its flags and the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponState {
    Active,
    Redeemed,
    Deactivated,
    Expired,
}

/// Administrative switch requested by operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponStatus {
    Active,
    Inactive,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub discount_type: DiscountKind,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub discount_value: Decimal,
    #[serde(default, serialize_with = "rust_decimal::serde::float_option::serialize")]
    pub minimum_spend: Option<Decimal>,
    #[serde(default)]
    pub expiry_date: Option<ExpiryDate>,
    pub is_used: bool,
    #[serde(default)]
    pub used_at: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub assigned_to_email: Option<String>,
    #[serde(default)]
    pub is_assigned: bool,
    #[serde(default)]
    pub qr_code_data: Option<String>,
    #[serde(default)]
    pub short_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    pub fn new(input: CouponInput, now: DateTime<Utc>, default_expiry: Duration) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let code = match input.code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => {
                if code.chars().all(|c| c.is_ascii_alphanumeric()) {
                    code.to_uppercase()
                } else {
                    errors.add("code", "Code may only contain letters and digits.");
                    String::new()
                }
            }
            _ => {
                errors.add("code", "Code is required.");
                String::new()
            }
        };

        let discount_type = match input.discount_type.as_deref() {
            Some(kind) if !kind.trim().is_empty() => match kind.parse::<DiscountKind>() {
                Ok(kind) => Some(kind),
                Err(e) => {
                    errors.add("discount_type", e);
                    None
                }
            },
            _ => {
                errors.add("discount_type", "Discount type is required.");
                None
            }
        };

        let discount_value = match input.discount_value.as_ref().filter(|v| !v.is_null()) {
            Some(value) => match parse_amount(value) {
                Some(amount) if amount.is_sign_negative() && !amount.is_zero() => {
                    errors.add("discount_value", "Discount value must not be negative.");
                    None
                }
                Some(amount) => Some(amount),
                None => {
                    errors.add("discount_value", "Discount value must be a number.");
                    None
                }
            },
            None => {
                errors.add("discount_value", "Discount value is required.");
                None
            }
        };

        if let (Some(DiscountKind::Percentage), Some(value)) = (discount_type, discount_value) {
            if value > Decimal::ONE_HUNDRED {
                errors.add("discount_value", "Percentage discount must be between 0 and 100.");
            }
        }

        let minimum_spend = match input.minimum_spend.as_ref().filter(|v| !v.is_null() && !is_blank(v)) {
            Some(value) => match parse_amount(value) {
                Some(amount) if amount.is_sign_negative() && !amount.is_zero() => {
                    errors.add("minimum_spend", "Minimum spend must not be negative.");
                    None
                }
                Some(amount) => Some(amount),
                None => {
                    errors.add("minimum_spend", "Minimum spend must be a number.");
                    None
                }
            },
            None => None,
        };

        let expiry_date = match input.expiry_date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => match ExpiryDate::from(raw) {
                Ok(expiry) => Some(expiry),
                Err(e) => {
                    errors.add("expiry_date", e);
                    None
                }
            },
            None => Some(ExpiryDate::from_instant(now + default_expiry)),
        };

        let assigned_to_email = match input.assigned_to_email.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(raw) => match normalize_email(raw) {
                Ok(email) => Some(email),
                Err(e) => {
                    errors.add("assigned_to_email", e);
                    None
                }
            },
            None => None,
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        let (Some(discount_type), Some(discount_value)) = (discount_type, discount_value) else {
            return Err(errors);
        };

        let name = input
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| code.clone());

        Ok(Coupon {
            id: Uuid::new_v4(),
            is_assigned: assigned_to_email.is_some(),
            code,
            name,
            description: input.description.filter(|d| !d.trim().is_empty()),
            discount_type,
            discount_value,
            minimum_spend,
            expiry_date,
            is_used: false,
            used_at: None,
            is_active: true,
            assigned_to_email,
            qr_code_data: input.qr_code_data,
            short_url: input.short_url,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.as_ref().map_or(false, |expiry| expiry.has_passed(now))
    }

    /// Redemption wins over deactivation, which wins over expiry.
    pub fn state(&self, now: DateTime<Utc>) -> CouponState {
        if self.is_used {
            CouponState::Redeemed
        } else if !self.is_active {
            CouponState::Deactivated
        } else if self.is_expired(now) {
            CouponState::Expired
        } else {
            CouponState::Active
        }
    }

    pub fn discount_display(&self) -> String {
        match self.discount_type {
            DiscountKind::Percentage => format!("{}%", self.discount_value.normalize()),
            _ => format!("${}", self.discount_value.normalize()),
        }
    }
}

fn is_blank(value: &Value) -> bool {
    value.as_str().map_or(false, |s| s.trim().is_empty())
}

fn parse_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => Decimal::from_str(&number.to_string())
            .or_else(|_| Decimal::from_scientific(&number.to_string()))
            .ok(),
        Value::String(text) => Decimal::from_str(text.trim()).ok(),
        _ => None,
    }
}

/// Unvalidated coupon fields as an admin submits them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CouponInput {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub discount_type: Option<String>,
    pub discount_value: Option<Value>,
    pub minimum_spend: Option<Value>,
    pub expiry_date: Option<String>,
    pub assigned_to_email: Option<String>,
    #[serde(skip)]
    pub qr_code_data: Option<String>,
    #[serde(skip)]
    pub short_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GiftCouponRequest {
    pub recipient_email: String,
    pub sender_email: String,
    pub name: String,
    pub discount_type: DiscountKind,
    pub discount_value: Decimal,
    pub expiry_date: String,
    pub description: Option<String>,
    pub minimum_spend: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClaimRequest {
    pub email: String,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusRequest {
    pub status: CouponStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkDeleteRequest {
    pub coupon_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkStatusRequest {
    pub coupon_ids: Vec<String>,
    pub status: CouponStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedeemRequest {
    pub user_email: Option<String>,
}

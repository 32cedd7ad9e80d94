use axum::Json;
use serde::{Deserialize, Serialize};

use crate::models::referral::ReferralRole;

pub mod analytics;
pub mod coupon;
pub mod referral;

#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    data: T,
}
impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self { data })
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedCount {
    pub deleted_count: usize,
}

#[derive(Debug, Serialize)]
pub struct UpdatedCount {
    pub updated_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct CouponQueryParams {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReferralQueryParams {
    pub email: String,
    #[serde(default = "default_role")]
    pub role: ReferralRole,
}

fn default_role() -> ReferralRole {
    ReferralRole::Referrer
}

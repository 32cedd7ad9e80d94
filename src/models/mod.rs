pub mod analytics;
pub mod coupon;
pub mod referral;
pub mod usage;

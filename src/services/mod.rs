pub mod analytics_service;
pub mod coupon_service;

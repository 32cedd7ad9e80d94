use axum::Router;

use crate::{
    http_server::AppState,
    routes::{analytics::analytics_routes, coupon::coupon_routes, referral::referral_routes},
};

pub mod analytics;
pub mod coupon;
pub mod referral;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(coupon_routes())
        .merge(referral_routes())
        .merge(analytics_routes())
}

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{
    handlers::coupon::{
        handle_bulk_delete_coupons, handle_bulk_set_coupon_status, handle_claim_coupon, handle_create_coupon,
        handle_create_gift_coupon, handle_create_referral_coupon, handle_delete_coupon, handle_get_coupon,
        handle_get_coupons, handle_redeem_coupon, handle_set_coupon_status,
    },
    http_server::AppState,
};

pub fn coupon_routes() -> Router<AppState> {
    Router::new()
        .route("/coupons", get(handle_get_coupons).post(handle_create_coupon))
        .route("/coupons/gift", post(handle_create_gift_coupon))
        .route("/coupons/referral", post(handle_create_referral_coupon))
        .route("/coupons/claim", post(handle_claim_coupon))
        .route("/coupons/bulk-delete", post(handle_bulk_delete_coupons))
        .route("/coupons/bulk-status", post(handle_bulk_set_coupon_status))
        .route("/coupons/:id", get(handle_get_coupon).delete(handle_delete_coupon))
        .route("/coupons/:id/redeem", post(handle_redeem_coupon))
        .route("/coupons/:id/status", put(handle_set_coupon_status))
}

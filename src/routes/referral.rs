use axum::{routing::get, Router};

use crate::{handlers::referral::handle_get_referrals, http_server::AppState};

pub fn referral_routes() -> Router<AppState> {
    Router::new().route("/referrals", get(handle_get_referrals))
}

use axum::{extract::State, Json};

use crate::{handlers::SuccessResponse, http_server::AppState, models::analytics::CouponAnalytics};

pub async fn handle_get_analytics(State(state): State<AppState>) -> Json<SuccessResponse<CouponAnalytics>> {
    SuccessResponse::new(state.analytics.compute_analytics().await)
}

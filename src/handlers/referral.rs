use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    handlers::{ReferralQueryParams, SuccessResponse},
    http_server::AppState,
    models::referral::Referral,
    AppError,
};

pub async fn handle_get_referrals(
    State(state): State<AppState>,
    Query(params): Query<ReferralQueryParams>,
) -> Result<Json<SuccessResponse<Vec<Referral>>>, AppError> {
    if params.email.trim().is_empty() {
        return Err(AppError::BadRequest("email query parameter is required".to_string()));
    }

    let referrals = state.coupons.referrals_for_email(&params.email, params.role).await;

    Ok(SuccessResponse::new(referrals))
}

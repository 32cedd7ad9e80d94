use axum::{
    extract::{self, Path, Query, State},
    http::StatusCode,
    response::NoContent,
    Json,
};

use crate::{
    handlers::{CouponQueryParams, DeletedCount, SuccessResponse, UpdatedCount},
    http_server::AppState,
    models::{
        coupon::{
            BulkDeleteRequest, BulkStatusRequest, ClaimRequest, Coupon, CouponInput, GiftCouponRequest,
            RedeemRequest, StatusRequest,
        },
        referral::{ReferralCouponRequest, ReferralCoupons},
    },
    AppError,
};

pub async fn handle_get_coupons(
    State(state): State<AppState>,
    Query(params): Query<CouponQueryParams>,
) -> Json<SuccessResponse<Vec<Coupon>>> {
    let coupons = match params.email.as_deref().filter(|e| !e.trim().is_empty()) {
        Some(email) => state.coupons.coupons_for_email(email).await,
        None => state.coupons.list_coupons().await,
    };

    SuccessResponse::new(coupons)
}

pub async fn handle_create_coupon(
    State(state): State<AppState>,
    extract::Json(input): Json<CouponInput>,
) -> Result<(StatusCode, Json<SuccessResponse<Coupon>>), AppError> {
    let coupon = state.coupons.create_coupon(input).await?;

    Ok((StatusCode::CREATED, SuccessResponse::new(coupon)))
}

pub async fn handle_get_coupon(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse<Coupon>>, AppError> {
    let coupon = state.coupons.get_coupon(&id).await?;

    Ok(SuccessResponse::new(coupon))
}

pub async fn handle_delete_coupon(State(state): State<AppState>, Path(id): Path<String>) -> Result<NoContent, AppError> {
    state.coupons.delete(&id).await?;

    Ok(NoContent)
}

pub async fn handle_create_gift_coupon(
    State(state): State<AppState>,
    extract::Json(request): Json<GiftCouponRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<Coupon>>), AppError> {
    let coupon = state.coupons.create_gift_coupon(request).await?;

    Ok((StatusCode::CREATED, SuccessResponse::new(coupon)))
}

pub async fn handle_create_referral_coupon(
    State(state): State<AppState>,
    extract::Json(request): Json<ReferralCouponRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<ReferralCoupons>>), AppError> {
    let created = state.coupons.create_referral_coupon(request).await?;

    Ok((StatusCode::CREATED, SuccessResponse::new(created)))
}

pub async fn handle_claim_coupon(
    State(state): State<AppState>,
    extract::Json(request): Json<ClaimRequest>,
) -> Result<Json<SuccessResponse<Vec<Coupon>>>, AppError> {
    let coupons = state
        .coupons
        .claim(request.coupon_code.as_deref(), &request.email)
        .await?;

    Ok(SuccessResponse::new(coupons))
}

pub async fn handle_redeem_coupon(
    State(state): State<AppState>,
    Path(id_or_code): Path<String>,
    request: Option<Json<RedeemRequest>>,
) -> Result<Json<SuccessResponse<Coupon>>, AppError> {
    let user_email = request.and_then(|Json(r)| r.user_email);
    let coupon = state.coupons.redeem(&id_or_code, user_email.as_deref()).await?;

    Ok(SuccessResponse::new(coupon))
}

pub async fn handle_set_coupon_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    extract::Json(request): Json<StatusRequest>,
) -> Result<Json<SuccessResponse<Coupon>>, AppError> {
    let coupon = state.coupons.set_status(&id, request.status).await?;

    Ok(SuccessResponse::new(coupon))
}

pub async fn handle_bulk_delete_coupons(
    State(state): State<AppState>,
    extract::Json(request): Json<BulkDeleteRequest>,
) -> Json<SuccessResponse<DeletedCount>> {
    let deleted_count = state.coupons.bulk_delete(&request.coupon_ids).await;
    tracing::info!("Bulk delete removed {} of {} coupons", deleted_count, request.coupon_ids.len());

    SuccessResponse::new(DeletedCount { deleted_count })
}

pub async fn handle_bulk_set_coupon_status(
    State(state): State<AppState>,
    extract::Json(request): Json<BulkStatusRequest>,
) -> Json<SuccessResponse<UpdatedCount>> {
    let updated_count = state.coupons.bulk_set_status(&request.coupon_ids, request.status).await;
    tracing::info!(
        "Bulk status change updated {} of {} coupons",
        updated_count,
        request.coupon_ids.len()
    );

    SuccessResponse::new(UpdatedCount { updated_count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        routes::coupon::coupon_routes,
        utils::{test_app_state::create_test_app_state, test_fixtures::coupon_input},
    };
    use axum::{
        body::{to_bytes, Body},
        http::{self, Request},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app(state: AppState) -> Router {
        coupon_routes().with_state(state)
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_create_coupon_returns_created_record() {
        let state = create_test_app_state();

        let (status, body) = send(
            test_app(state),
            "POST",
            "/coupons",
            Some(json!({
                "code": "web10",
                "name": "Web ten",
                "discount_type": "percentage",
                "discount_value": "10",
                "assigned_to_email": "Shopper@X.com"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["code"], "WEB10");
        assert_eq!(body["data"]["discount_value"], json!(10.0));
        assert_eq!(body["data"]["is_assigned"], true);
        assert_eq!(body["data"]["assigned_to_email"], "shopper@x.com");
    }

    #[tokio::test]
    async fn test_create_coupon_validation_lists_fields() {
        let state = create_test_app_state();

        let (status, body) = send(
            test_app(state),
            "POST",
            "/coupons",
            Some(json!({"code": "NOPE1", "discount_type": "percentage", "discount_value": -5})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"][0]["field"], "discount_value");
    }

    #[tokio::test]
    async fn test_duplicate_code_is_conflict() {
        let state = create_test_app_state();
        state
            .coupons
            .create_coupon(coupon_input("SAME1", "fixed_amount", json!(5)))
            .await
            .unwrap();

        let (status, body) = send(
            test_app(state),
            "POST",
            "/coupons",
            Some(json!({"code": "SAME1", "discount_type": "fixed_amount", "discount_value": 5})),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("SAME1"));
    }

    #[tokio::test]
    async fn test_redeem_twice_conflicts() {
        let state = create_test_app_state();
        state
            .coupons
            .create_coupon(coupon_input("REDEEM1", "fixed_amount", json!(5)))
            .await
            .unwrap();
        let app = test_app(state);

        let (first, body) = send(app.clone(), "POST", "/coupons/REDEEM1/redeem", None).await;
        assert_eq!(first, StatusCode::OK);
        assert_eq!(body["data"]["is_used"], true);

        let (second, _) = send(
            app,
            "POST",
            "/coupons/REDEEM1/redeem",
            Some(json!({"user_email": "buyer@x.com"})),
        )
        .await;
        assert_eq!(second, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_get_unknown_coupon_is_not_found() {
        let state = create_test_app_state();

        let (status, body) = send(test_app(state), "GET", "/coupons/MISSING9", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_claim_and_list_by_email() {
        let state = create_test_app_state();
        state
            .coupons
            .create_coupon(coupon_input("CLAIMME1", "fixed_amount", json!(5)))
            .await
            .unwrap();
        let app = test_app(state);

        let (status, body) = send(
            app.clone(),
            "POST",
            "/coupons/claim",
            Some(json!({"email": "c@x.com", "coupon_code": "claimme1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, body) = send(app, "GET", "/coupons?email=c@x.com", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["code"], "CLAIMME1");
    }

    #[tokio::test]
    async fn test_status_and_bulk_endpoints() {
        let state = create_test_app_state();
        let a = state
            .coupons
            .create_coupon(coupon_input("BULK1", "fixed_amount", json!(5)))
            .await
            .unwrap();
        let b = state
            .coupons
            .create_coupon(coupon_input("BULK2", "fixed_amount", json!(5)))
            .await
            .unwrap();
        let app = test_app(state);

        let (status, body) = send(
            app.clone(),
            "PUT",
            &format!("/coupons/{}/status", a.id),
            Some(json!({"status": "inactive"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["is_active"], false);
        assert_eq!(body["data"]["is_used"], false);

        let (status, body) = send(
            app.clone(),
            "POST",
            "/coupons/bulk-status",
            Some(json!({"coupon_ids": [a.id, b.id, "bogus"], "status": "active"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["updated_count"], 2);

        let (status, body) = send(
            app.clone(),
            "POST",
            "/coupons/bulk-delete",
            Some(json!({"coupon_ids": [a.id, "bogus"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["deleted_count"], 1);

        let (status, _) = send(app.clone(), "DELETE", &format!("/coupons/{}", b.id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(app, "GET", "/coupons", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_referral_endpoint_creates_pair() {
        let state = create_test_app_state();

        let (status, body) = send(
            test_app(state),
            "POST",
            "/coupons/referral",
            Some(json!({
                "referrer_email": "a@x.com",
                "referee_email": "b@x.com",
                "discount_value": 10,
                "referrer_gets_reward": true,
                "referrer_reward_value": 5
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["referee_coupon"]["assigned_to_email"], "b@x.com");
        assert_eq!(body["data"]["referrer_coupon"]["assigned_to_email"], "a@x.com");
        assert_eq!(
            body["data"]["referral"]["coupon_id"],
            body["data"]["referee_coupon"]["id"]
        );
    }

    #[tokio::test]
    async fn test_gift_endpoint_preassigns() {
        let state = create_test_app_state();

        let (status, body) = send(
            test_app(state),
            "POST",
            "/coupons/gift",
            Some(json!({
                "recipient_email": "friend@x.com",
                "sender_email": "me@x.com",
                "name": "Thanks",
                "discount_type": "fixed",
                "discount_value": 15,
                "expiry_date": "2099-06-30"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["discount_type"], "fixed_amount");
        assert_eq!(body["data"]["is_assigned"], true);
        assert!(body["data"]["short_url"].as_str().unwrap().starts_with("https://swicks.co/"));
    }
}

use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    db_persistence::DbPersistence,
    models::{
        analytics::CouponAnalytics,
        coupon::{Coupon, CouponState},
        referral::Referral,
    },
};

#[derive(Clone)]
pub struct AnalyticsService {
    db: Arc<DbPersistence>,
}

impl AnalyticsService {
    pub fn new(db: Arc<DbPersistence>) -> Self {
        Self { db }
    }

    /// Never fails: any store error yields all-zero figures.
    pub async fn compute_analytics(&self) -> CouponAnalytics {
        let coupons = match self.db.coupons.find_all().await {
            Ok(coupons) => coupons,
            Err(e) => {
                error!("Analytics could not load coupons: {}", e);
                return CouponAnalytics::default();
            }
        };

        let referrals = match self.db.referrals.find_all().await {
            Ok(referrals) => referrals,
            Err(e) => {
                error!("Analytics could not load referrals: {}", e);
                return CouponAnalytics::default();
            }
        };

        let analytics = summarize(&coupons, &referrals, Utc::now());
        info!(
            "Analytics computed over {} coupons and {} referrals",
            analytics.total_coupons,
            referrals.len()
        );
        analytics
    }
}

/// Percentage of `used` in `count`, one decimal place, zero for an empty subset.
fn redemption_rate(used: u64, count: u64) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(used) * Decimal::ONE_HUNDRED / Decimal::from(count)).round_dp(1)
}

/// Classifies every coupon by state and origin.
///
/// A coupon is referral-origin when any referral points at it through
/// `coupon_id`; everything else is gift-origin. Referrals without a coupon
/// link are ignored. Only active coupons add to
/// `total_value`.
pub fn summarize(coupons: &[Coupon], referrals: &[Referral], now: DateTime<Utc>) -> CouponAnalytics {
    let referral_coupon_ids: HashSet<Uuid> = referrals.iter().filter_map(|r| r.coupon_id).collect();

    let mut analytics = CouponAnalytics::default();
    let mut gift_used = 0;
    let mut referral_used = 0;

    for coupon in coupons {
        let from_referral = referral_coupon_ids.contains(&coupon.id);
        analytics.total_coupons += 1;
        if from_referral {
            analytics.referral_coupons += 1;
        } else {
            analytics.gift_coupons += 1;
        }

        match coupon.state(now) {
            CouponState::Redeemed => {
                analytics.used_coupons += 1;
                if from_referral {
                    referral_used += 1;
                } else {
                    gift_used += 1;
                }
            }
            CouponState::Deactivated => analytics.inactive_coupons += 1,
            CouponState::Expired => analytics.expired_coupons += 1,
            CouponState::Active => {
                analytics.active_coupons += 1;
                analytics.total_value += coupon.discount_value;
            }
        }
    }

    analytics.total_value = analytics.total_value.round_dp(2);
    analytics.gift_redemption_rate = redemption_rate(gift_used, analytics.gift_coupons);
    analytics.referral_redemption_rate = redemption_rate(referral_used, analytics.referral_coupons);
    analytics.overall_redemption_rate = redemption_rate(analytics.used_coupons, analytics.total_coupons);

    analytics
}

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    config::Config,
    db_persistence::DbPersistence,
    models::{
        coupon::{Coupon, CouponInput, DiscountKind},
        referral::Referral,
    },
    services::coupon_service::CouponService,
    store::{InMemoryStore, MockRecordStore, RecordStore},
};

pub fn coupon_input(code: &str, kind: &str, value: Value) -> CouponInput {
    CouponInput {
        code: Some(code.to_string()),
        discount_type: Some(kind.to_string()),
        discount_value: Some(value),
        ..Default::default()
    }
}

/// Unassigned fixed-amount coupon worth 10, expiring in 30 days.
pub fn coupon_with_code(code: &str) -> Coupon {
    Coupon::new(coupon_input(code, "fixed_amount", json!(10)), Utc::now(), Duration::days(30))
        .expect("fixture coupon is valid")
}

pub fn referral_between(referrer: &str, referee: &str) -> Referral {
    let now = Utc::now();
    Referral {
        id: Uuid::new_v4(),
        referrer_email: referrer.to_string(),
        referee_email: referee.to_string(),
        coupon_id: Some(Uuid::new_v4()),
        discount_applied: Decimal::from(10),
        discount_type: DiscountKind::FixedAmount,
        referrer_gets_reward: false,
        referrer_reward_coupon_id: None,
        referrer_reward_value: None,
        redeemed_at: Some(now),
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn memory_db() -> Arc<DbPersistence> {
    let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
    Arc::new(DbPersistence::new(store))
}

pub fn db_over(store: MockRecordStore) -> Arc<DbPersistence> {
    let store: Arc<dyn RecordStore> = Arc::new(store);
    Arc::new(DbPersistence::new(store))
}

pub fn memory_service() -> (CouponService, Arc<DbPersistence>) {
    let db = memory_db();
    (CouponService::new(db.clone(), Arc::new(Config::default())), db)
}

pub fn service_over(store: MockRecordStore) -> CouponService {
    CouponService::new(db_over(store), Arc::new(Config::default()))
}

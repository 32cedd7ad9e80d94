use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::{
    models::coupon::Coupon,
    repositories::{fields, from_record, from_records, to_record, DbResult},
    store::{Filter, Order, Record, RecordStore},
};

pub const COUPONS_TABLE: &str = "coupons";

#[derive(Clone)]
pub struct CouponRepository {
    store: Arc<dyn RecordStore>,
}

impl CouponRepository {
    pub fn new(store: &Arc<dyn RecordStore>) -> Self {
        Self { store: store.clone() }
    }

    pub async fn create(&self, coupon: &Coupon) -> DbResult<Coupon> {
        let stored = self.store.insert(COUPONS_TABLE, to_record(coupon)?).await?;
        from_record(stored)
    }

    pub async fn find_by_id(&self, id: &Uuid) -> DbResult<Option<Coupon>> {
        self.find_one(Filter::eq("id", id)).await
    }

    pub async fn find_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        self.find_one(Filter::eq("code", code.trim().to_uppercase())).await
    }

    /// Ids are tried first; anything that is not a uuid is looked up as a code.
    pub async fn find_by_id_or_code(&self, key: &str) -> DbResult<Option<Coupon>> {
        match Uuid::parse_str(key.trim()) {
            Ok(id) => self.find_by_id(&id).await,
            Err(_) => self.find_by_code(key).await,
        }
    }

    pub async fn find_all(&self) -> DbResult<Vec<Coupon>> {
        let records = self
            .store
            .select(COUPONS_TABLE, None, Some(Order::desc("created_at")))
            .await?;
        from_records(records)
    }

    pub async fn find_all_by_email(&self, email: &str) -> DbResult<Vec<Coupon>> {
        let records = self
            .store
            .select(
                COUPONS_TABLE,
                Some(Filter::eq("assigned_to_email", email)),
                Some(Order::desc("created_at")),
            )
            .await?;
        from_records(records)
    }

    pub async fn assign(&self, id: &Uuid, email: &str, now: DateTime<Utc>) -> DbResult<Option<Coupon>> {
        self.update_fields(
            id,
            fields(json!({
                "assigned_to_email": email,
                "is_assigned": true,
                "updated_at": now,
            })),
        )
        .await
    }

    pub async fn mark_used(&self, id: &Uuid, now: DateTime<Utc>) -> DbResult<Option<Coupon>> {
        self.update_fields(
            id,
            fields(json!({
                "is_used": true,
                "used_at": now,
                "updated_at": now,
            })),
        )
        .await
    }

    pub async fn set_active(&self, id: &Uuid, is_active: bool, now: DateTime<Utc>) -> DbResult<Option<Coupon>> {
        self.update_fields(
            id,
            fields(json!({
                "is_active": is_active,
                "updated_at": now,
            })),
        )
        .await
    }

    /// Returns the number of records removed.
    pub async fn delete(&self, id: &Uuid) -> DbResult<usize> {
        let removed = self.store.delete(COUPONS_TABLE, Filter::eq("id", id)).await?;
        Ok(removed.len())
    }

    async fn find_one(&self, filter: Filter) -> DbResult<Option<Coupon>> {
        let records = self.store.select(COUPONS_TABLE, Some(filter), None).await?;
        records.into_iter().next().map(from_record).transpose()
    }

    async fn update_fields(&self, id: &Uuid, changes: Record) -> DbResult<Option<Coupon>> {
        let records = self.store.update(COUPONS_TABLE, Filter::eq("id", id), changes).await?;
        records.into_iter().next().map(from_record).transpose()
    }
}

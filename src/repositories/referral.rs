use std::sync::Arc;

use uuid::Uuid;

use crate::{
    models::referral::{Referral, ReferralRole},
    repositories::{from_record, from_records, to_record, DbResult},
    store::{Filter, Order, RecordStore},
};

pub const REFERRALS_TABLE: &str = "referrals";

#[derive(Clone)]
pub struct ReferralRepository {
    store: Arc<dyn RecordStore>,
}

impl ReferralRepository {
    pub fn new(store: &Arc<dyn RecordStore>) -> Self {
        Self { store: store.clone() }
    }

    pub async fn create(&self, referral: &Referral) -> DbResult<Referral> {
        let stored = self.store.insert(REFERRALS_TABLE, to_record(referral)?).await?;
        from_record(stored)
    }

    pub async fn find_all(&self) -> DbResult<Vec<Referral>> {
        let records = self
            .store
            .select(REFERRALS_TABLE, None, Some(Order::desc("created_at")))
            .await?;
        from_records(records)
    }

    pub async fn find_all_by_email(&self, role: ReferralRole, email: &str) -> DbResult<Vec<Referral>> {
        let records = self
            .store
            .select(
                REFERRALS_TABLE,
                Some(Filter::eq(role.column(), email)),
                Some(Order::desc("created_at")),
            )
            .await?;
        from_records(records)
    }

    pub async fn find_by_coupon(&self, coupon_id: &Uuid) -> DbResult<Vec<Referral>> {
        let records = self
            .store
            .select(REFERRALS_TABLE, Some(Filter::eq("coupon_id", coupon_id)), None)
            .await?;
        from_records(records)
    }
}

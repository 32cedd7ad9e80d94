use std::sync::Arc;

use crate::{
    models::usage::CouponUsage,
    repositories::{from_record, to_record, DbResult},
    store::{Filter, RecordStore},
};

pub const USAGE_TABLE: &str = "coupon_usage_tracking";

#[derive(Clone)]
pub struct UsageRepository {
    store: Arc<dyn RecordStore>,
}

impl UsageRepository {
    pub fn new(store: &Arc<dyn RecordStore>) -> Self {
        Self { store: store.clone() }
    }

    pub async fn find_by_code(&self, coupon_code: &str) -> DbResult<Option<CouponUsage>> {
        let records = self
            .store
            .select(USAGE_TABLE, Some(Filter::eq("coupon_code", coupon_code)), None)
            .await?;
        records.into_iter().next().map(from_record).transpose()
    }

    /// Inserts the tally when the code has none yet, otherwise overwrites it.
    pub async fn save(&self, usage: &CouponUsage, exists: bool) -> DbResult<()> {
        let record = to_record(usage)?;
        if exists {
            self.store
                .update(USAGE_TABLE, Filter::eq("coupon_code", &usage.coupon_code), record)
                .await?;
        } else {
            self.store.insert(USAGE_TABLE, record).await?;
        }
        Ok(())
    }
}

use std::sync::Arc;

use tracing::info;

use crate::{
    config::{StoreBackend, StoreConfig},
    repositories::{coupon::CouponRepository, referral::ReferralRepository, usage::UsageRepository},
    store::{InMemoryStore, PostgrestStore, RecordStore},
};

#[derive(Clone)]
pub struct DbPersistence {
    pub coupons: CouponRepository,
    pub referrals: ReferralRepository,
    pub usage: UsageRepository,

    store: Arc<dyn RecordStore>,
}

impl DbPersistence {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        let coupons = CouponRepository::new(&store);
        let referrals = ReferralRepository::new(&store);
        let usage = UsageRepository::new(&store);

        Self {
            store,
            coupons,
            referrals,
            usage,
        }
    }

    /// Builds the store handle selected by configuration.
    pub fn connect(config: &StoreConfig) -> Self {
        let store: Arc<dyn RecordStore> = match config.backend {
            StoreBackend::Postgrest => {
                info!("Using PostgREST record store at {}", config.url);
                Arc::new(PostgrestStore::new(config))
            }
            StoreBackend::Memory => {
                info!("Using in-memory record store");
                Arc::new(InMemoryStore::new())
            }
        };

        Self::new(store)
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }
}

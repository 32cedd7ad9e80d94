//! # Coupon Tracker Library
//!
//! Issues, assigns, redeems and reports on discount coupons, including a
//! referral-reward flow. All state lives in an external record store that is
//! injected as an `Arc<dyn RecordStore>`; the lifecycle and analytics services
//! sit on top of it and are exposed through a JSON HTTP API.

pub mod args;
pub mod config;
pub mod db_persistence;
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod metrics;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use db_persistence::DbPersistence;
pub use http_server::AppState;
pub use services::{
    analytics_service::AnalyticsService,
    coupon_service::{CouponError, CouponService},
};
pub use store::{RecordStore, StoreError};

// Re-export errors
pub use errors::{AppError, AppResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get the library version
pub fn version() -> &'static str {
    VERSION
}

/// Get the library name
pub fn name() -> &'static str {
    NAME
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_name() {
        assert_eq!(name(), "coupon-tracker");
    }
}

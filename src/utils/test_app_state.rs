use std::sync::Arc;

use crate::{config::Config, http_server::AppState, utils::test_fixtures::memory_db};

/// AppState over a fresh in-memory store and the test configuration.
pub fn create_test_app_state() -> AppState {
    let config = Config::load_test_env().expect("Failed to load test configuration");

    AppState::new(memory_db(), Arc::new(config))
}

use axum::{routing::get, Router};

use crate::{handlers::analytics::handle_get_analytics, http_server::AppState};

pub fn analytics_routes() -> Router<AppState> {
    Router::new().route("/analytics", get(handle_get_analytics))
}

use clap::Parser;
use coupon_tracker::{
    args::Args,
    db_persistence::DbPersistence,
    errors::{AppError, AppResult},
    http_server::{self, AppState},
    Config,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> AppResult<()> {
    let args = Args::parse();

    // Load configuration from --config path (defaults to config/default.toml)
    let mut config = Config::load(&args.config).map_err(AppError::Config)?;

    // Apply CLI overrides
    if let Some(store) = args.store {
        config.store.backend = store;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_logging(&config.logging.level)?;

    info!("🚀 Starting Coupon Tracker v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", args.config);
    info!("Record store backend: {:?}", config.store.backend);
    if config.store.api_key.is_empty() {
        warn!("No record store API key configured");
    }

    let db = Arc::new(DbPersistence::connect(&config.store));

    let server_address = config.get_server_address();
    info!(
        "Coupons: {}-character codes, {} day default expiry, {} day referral expiry",
        config.coupons.code_length, config.coupons.default_expiry_days, config.coupons.referral_expiry_days
    );
    info!("HTTP API available at: http://{}", server_address);

    let state = AppState::new(db, Arc::new(config));
    http_server::start_server(state, &server_address).await
}

fn init_logging(level: &str) -> AppResult<()> {
    let log_level = match level.to_lowercase().as_str() {
        "error" => tracing::Level::ERROR,
        "warn" => tracing::Level::WARN,
        "info" => tracing::Level::INFO,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => {
            eprintln!("Invalid log level: {}, defaulting to info", level);
            tracing::Level::INFO
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("coupon_tracker={},tower_http={}", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    Ok(())
}

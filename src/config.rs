use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub coupons: CouponsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgrest,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponsConfig {
    pub code_length: usize,
    pub default_expiry_days: i64,
    pub referral_expiry_days: i64,
    pub max_code_attempts: u32,
    pub claim_base_url: String,
    pub short_url_base: String,
    pub short_code_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    pub fn load(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::new(config_path, config::FileFormat::Toml))
            .add_source(config::Environment::with_prefix("COUPON_TRACKER").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    #[cfg(test)]
    pub fn load_test_env() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/test"))
            .add_source(config::Environment::with_prefix("COUPON_TRACKER").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn get_default_expiry(&self) -> chrono::Duration {
        chrono::Duration::days(self.coupons.default_expiry_days)
    }

    pub fn get_referral_expiry(&self) -> chrono::Duration {
        chrono::Duration::days(self.coupons.referral_expiry_days)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                url: "http://127.0.0.1:54321".to_string(),
                api_key: String::new(),
                timeout_seconds: 30,
            },
            coupons: CouponsConfig {
                code_length: crate::utils::generate_coupon_code::DEFAULT_CODE_LENGTH,
                default_expiry_days: 365,
                referral_expiry_days: 30,
                max_code_attempts: 5,
                claim_base_url: "https://skinandwicks.com/claim".to_string(),
                short_url_base: "https://swicks.co".to_string(),
                short_code_length: 6,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

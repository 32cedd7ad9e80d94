use clap::Parser;

use crate::config::StoreBackend;

#[derive(Parser, Debug)]
#[command(name = "coupon-tracker")]
#[command(about = "Coupon issuance, referral rewards and redemption analytics")]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Record store backend override
    #[arg(long, value_enum)]
    pub store: Option<StoreBackend>,

    /// HTTP port override
    #[arg(long)]
    pub port: Option<u16>,
}

use anyhow::{bail, Context};
use clap::Parser;
use coupon_tracker::{
    args::Args,
    db_persistence::DbPersistence,
    models::coupon::CouponInput,
    services::coupon_service::{CouponError, CouponService},
    Config,
};
use serde_json::Value;
use std::{
    io::{self, Write},
    sync::Arc,
};

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn optional(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config).context("failed to load configuration")?;
    if let Some(store) = args.store {
        config.store.backend = store;
    }

    let db = Arc::new(DbPersistence::connect(&config.store));
    let service = CouponService::new(db, Arc::new(config));

    println!("--- Create Coupon ---");

    let mut code = prompt("Code (blank to generate)")?;
    if code.is_empty() {
        code = service.generate_code();
        println!("Generated code {}", code);
    }
    let name = prompt("Name")?;
    let discount_type = prompt("Discount type [percentage|fixed_amount|minimum_spend]")?;
    let discount_value = prompt("Discount value")?;
    let minimum_spend = prompt("Minimum spend (optional)")?;
    let expiry_date = prompt("Expiry date YYYY-MM-DD (optional)")?;
    let assigned_to_email = prompt("Assign to email (optional)")?;

    if discount_value.is_empty() {
        bail!("Discount value cannot be empty.");
    }

    let input = CouponInput {
        code: Some(code),
        name: optional(name),
        discount_type: Some(discount_type),
        discount_value: Some(Value::String(discount_value)),
        minimum_spend: optional(minimum_spend).map(Value::String),
        expiry_date: optional(expiry_date),
        assigned_to_email: optional(assigned_to_email),
        ..Default::default()
    };

    match service.create_coupon(input).await {
        Ok(coupon) => {
            println!("✅ Coupon created successfully!");
            println!("ID: {}", coupon.id);
            println!("Code: {}", coupon.code);
            println!("Discount: {}", coupon.discount_display());
            if let Some(expiry) = &coupon.expiry_date {
                println!("Expires: {}", expiry.0);
            }
        }
        Err(CouponError::Validation(errors)) => {
            for error in errors.errors() {
                eprintln!("❌ {}: {}", error.field, error.message);
            }
        }
        Err(e) => eprintln!("❌ Failed to create coupon: {}", e),
    }

    Ok(())
}

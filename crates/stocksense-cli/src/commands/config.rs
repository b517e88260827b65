use std::path::Path;

use stocksense_core::error::StockSenseError;
use stocksense_core::rules::{load_config, RuleConfig};

pub fn show(config: Option<&Path>) -> Result<(), StockSenseError> {
    let effective = match config {
        Some(path) => load_config(path)?,
        None => RuleConfig::default(),
    };
    println!("{}", serde_json::to_string_pretty(&effective)?);
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), StockSenseError> {
    let config = load_config(file)?;
    println!("Valid configuration: {}", file.display());
    println!(
        "  expiry alerts within {} days ({} critical)",
        config.expiry.alert_days, config.expiry.critical_days
    );
    println!(
        "  discounts for {}-{} days left, {}% / {}%",
        config.discount.min_days,
        config.discount.max_days,
        config.discount.high_discount_percent,
        config.discount.low_discount_percent
    );
    println!(
        "  restock below {} units: {} x from {}",
        config.restock.threshold, config.restock.quantity, config.restock.default_supplier
    );
    Ok(())
}

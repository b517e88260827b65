pub mod schema;

use crate::error::StockSenseError;
use rust_decimal::Decimal;
pub use schema::{DiscountRules, ExpiryRules, RestockRules, RuleConfig};
use serde_json::{Map, Value};
use std::path::Path;

/// Flat keys accepted by older config files, mapped to (group, leaf).
const LEGACY_FLAT_KEYS: &[(&str, &str, &str)] = &[
    ("expiry_alert_days", "expiry", "alert_days"),
    ("critical_expiry_days", "expiry", "critical_days"),
    ("discount_min_days", "discount", "min_days"),
    ("discount_max_days", "discount", "max_days"),
    ("restock_threshold", "restock", "threshold"),
];

/// Older leaf names inside a group: (group, alias, canonical).
const LEAF_ALIASES: &[(&str, &str, &str)] = &[
    ("discount", "stock_threshold_ratio", "stock_ratio_threshold"),
    ("discount", "high_discount_threshold_ratio", "high_discount_stock_ratio"),
    ("discount", "high_discount_pct", "high_discount_percent"),
    ("discount", "low_discount_pct", "low_discount_percent"),
    ("discount", "expected_clear_pct", "expected_clear_percent"),
    ("discount", "recovery_factor", "revenue_recovery_ratio"),
    ("restock", "qty", "quantity"),
    ("restock", "cost", "estimated_cost"),
    ("restock", "supplier", "default_supplier"),
];

impl RuleConfig {
    /// Apply overrides key-wise on top of this config.
    ///
    /// Nested groups merge recursively; any other value replaces the current
    /// one. Keys absent from `overrides` keep their current value, so
    /// `{"discount": {"min_days": 5}}` leaves every other discount field alone.
    pub fn merge(&self, overrides: &Value) -> Result<RuleConfig, StockSenseError> {
        let overrides = normalize_overrides(overrides)?;
        let mut merged = serde_json::to_value(self)?;
        merge_values(&mut merged, overrides);

        let config: RuleConfig = serde_json::from_value(merged)
            .map_err(|e| StockSenseError::ConfigInvalid(e.to_string()))?;
        validate_config(&config)?;
        Ok(config)
    }
}

/// Load an override file and merge it onto the defaults.
pub fn load_config(path: &Path) -> Result<RuleConfig, StockSenseError> {
    let content = std::fs::read_to_string(path).map_err(|e| StockSenseError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_config(&content, path)
}

/// Parse an override document, attributing syntax errors to `source`.
pub fn parse_config(json: &str, source: &Path) -> Result<RuleConfig, StockSenseError> {
    let overrides: Value = serde_json::from_str(json).map_err(|e| StockSenseError::ConfigLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    RuleConfig::default().merge(&overrides)
}

/// Parse an override document (no file path context).
pub fn parse_config_str(json: &str) -> Result<RuleConfig, StockSenseError> {
    let overrides: Value = serde_json::from_str(json).map_err(StockSenseError::Json)?;
    RuleConfig::default().merge(&overrides)
}

/// Validate that a config is internally consistent.
pub fn validate_config(config: &RuleConfig) -> Result<(), StockSenseError> {
    let discount = &config.discount;

    let ratios = [
        ("discount.stock_ratio_threshold", discount.stock_ratio_threshold),
        (
            "discount.high_discount_stock_ratio",
            discount.high_discount_stock_ratio,
        ),
        (
            "discount.revenue_recovery_ratio",
            discount.revenue_recovery_ratio,
        ),
    ];
    for (key, value) in ratios {
        if value < Decimal::ZERO {
            return Err(StockSenseError::ConfigInvalid(format!(
                "{key} must be non-negative, got {value}"
            )));
        }
    }

    if discount.min_days > discount.max_days {
        return Err(StockSenseError::ConfigInvalid(format!(
            "discount.min_days ({}) must not exceed discount.max_days ({})",
            discount.min_days, discount.max_days
        )));
    }

    if config.restock.default_supplier.trim().is_empty() {
        return Err(StockSenseError::ConfigInvalid(
            "restock.default_supplier must not be empty".into(),
        ));
    }

    Ok(())
}

/// Recursive key-wise merge: objects merge, everything else replaces.
pub fn merge_values(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            for (key, value) in override_map {
                let nested = value.is_object() && base_map.get(&key).is_some_and(Value::is_object);
                if !nested {
                    base_map.insert(key, value);
                } else if let Some(existing) = base_map.get_mut(&key) {
                    merge_values(existing, value);
                }
            }
        }
        (base, overrides) => *base = overrides,
    }
}

/// Rewrite legacy flat keys and leaf aliases into the canonical nested shape.
fn normalize_overrides(overrides: &Value) -> Result<Value, StockSenseError> {
    let Value::Object(map) = overrides else {
        return Err(StockSenseError::ConfigInvalid(
            "overrides must be a JSON object".into(),
        ));
    };

    let mut normalized = Map::new();
    for (key, value) in map {
        if let Some((_, group, leaf)) = LEGACY_FLAT_KEYS.iter().find(|(flat, _, _)| flat == key) {
            let mut nested = Map::new();
            nested.insert(leaf.to_string(), value.clone());
            merge_values(
                normalized
                    .entry(group.to_string())
                    .or_insert_with(|| Value::Object(Map::new())),
                Value::Object(nested),
            );
            continue;
        }

        let value = match value {
            Value::Object(leaves) => Value::Object(canonical_leaves(key, leaves)),
            other => other.clone(),
        };
        match normalized.get_mut(key) {
            Some(existing) => merge_values(existing, value),
            None => {
                normalized.insert(key.clone(), value);
            }
        }
    }

    Ok(Value::Object(normalized))
}

fn canonical_leaves(group: &str, leaves: &Map<String, Value>) -> Map<String, Value> {
    leaves
        .iter()
        .map(|(leaf, value)| {
            let canonical = LEAF_ALIASES
                .iter()
                .find(|(g, alias, _)| *g == group && alias == leaf)
                .map(|(_, _, canonical)| canonical.to_string())
                .unwrap_or_else(|| leaf.clone());
            (canonical, value.clone())
        })
        .collect()
}

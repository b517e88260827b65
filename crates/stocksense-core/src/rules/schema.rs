use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Every threshold the rule engine reads, grouped by recommendation kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    pub expiry: ExpiryRules,
    pub discount: DiscountRules,
    pub restock: RestockRules,
}

/// When an item is flagged as expiring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpiryRules {
    /// Alert when 0 < days left <= this.
    pub alert_days: u32,
    /// Alerts at or below this many days are CRITICAL, others HIGH.
    pub critical_days: u32,
}

impl Default for ExpiryRules {
    fn default() -> Self {
        ExpiryRules {
            alert_days: 30,
            critical_days: 7,
        }
    }
}

/// Markdown suggestions for stock unlikely to sell through before expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscountRules {
    pub min_days: u32,
    pub max_days: u32,
    /// Discount when predicted sales < stock x this ratio.
    pub stock_ratio_threshold: Decimal,
    /// Use the high percentage when predicted sales < stock x this ratio.
    pub high_discount_stock_ratio: Decimal,
    pub high_discount_percent: u32,
    pub low_discount_percent: u32,
    /// Reported as-is on every discount recommendation.
    pub expected_clear_percent: u32,
    pub revenue_recovery_ratio: Decimal,
}

impl Default for DiscountRules {
    fn default() -> Self {
        DiscountRules {
            min_days: 7,
            max_days: 14,
            stock_ratio_threshold: Decimal::new(5, 1),
            high_discount_stock_ratio: Decimal::new(3, 1),
            high_discount_percent: 15,
            low_discount_percent: 10,
            expected_clear_percent: 80,
            revenue_recovery_ratio: Decimal::new(1, 1),
        }
    }
}

/// Reorder suggestions for low stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestockRules {
    /// Order when stock < threshold.
    pub threshold: u64,
    pub quantity: u32,
    pub estimated_cost: u64,
    pub default_supplier: String,
}

impl Default for RestockRules {
    fn default() -> Self {
        RestockRules {
            threshold: 20,
            quantity: 100,
            estimated_cost: 5000,
            default_supplier: "Default Supplier".to_string(),
        }
    }
}

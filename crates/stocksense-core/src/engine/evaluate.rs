use crate::engine::outcome::{
    DiscountRecommendation, ExpiryAlert, RecordEvaluation, RestockOrder, Urgency,
};
use crate::model::MedicineRecord;
use crate::rules::schema::{DiscountRules, ExpiryRules, RestockRules, RuleConfig};
use chrono::NaiveDateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Evaluate one record against every rule group.
///
/// Pure in `(record, config, reference)`: no state is shared between records,
/// so any evaluation order or sharding yields the same per-record result.
pub fn evaluate_record(
    record: &MedicineRecord,
    config: &RuleConfig,
    reference: NaiveDateTime,
) -> RecordEvaluation {
    let days_left = record.days_until_expiry(reference);
    RecordEvaluation {
        expiry_alert: expiry_alert(record, days_left, &config.expiry),
        discount: discount(record, days_left, reference, &config.discount),
        restock: restock(record, &config.restock),
    }
}

/// Alert when 0 < days_left <= alert_days.
fn expiry_alert(record: &MedicineRecord, days_left: i64, rules: &ExpiryRules) -> Option<ExpiryAlert> {
    if days_left <= 0 || days_left > i64::from(rules.alert_days) {
        return None;
    }

    let urgency = if days_left <= i64::from(rules.critical_days) {
        Urgency::Critical
    } else {
        Urgency::High
    };
    tracing::debug!(
        medicine = record.name(),
        days_left,
        %urgency,
        "expiry alert"
    );

    Some(ExpiryAlert {
        medicine: record.name().to_string(),
        days_left,
        stock: record.stock(),
        urgency,
    })
}

/// Discount when inside the day window and predicted sales leave too much stock.
fn discount(
    record: &MedicineRecord,
    days_left: i64,
    reference: NaiveDateTime,
    rules: &DiscountRules,
) -> Option<DiscountRecommendation> {
    if days_left < i64::from(rules.min_days) || days_left > i64::from(rules.max_days) {
        return None;
    }

    let stock = Decimal::from(record.stock());
    let predicted = record.predicted_sales_before_expiry(reference);
    if predicted >= scaled(stock, rules.stock_ratio_threshold) {
        return None;
    }

    let discount_percent = if predicted < scaled(stock, rules.high_discount_stock_ratio) {
        rules.high_discount_percent
    } else {
        rules.low_discount_percent
    };
    let revenue_recovery = scaled(scaled(stock, rules.revenue_recovery_ratio), Decimal::ONE_HUNDRED)
        .floor()
        .to_u64()
        .unwrap_or(u64::MAX);
    tracing::debug!(
        medicine = record.name(),
        discount_percent,
        %predicted,
        "discount recommended"
    );

    Some(DiscountRecommendation {
        medicine: record.name().to_string(),
        discount_percent,
        expected_clear_pct: rules.expected_clear_percent,
        revenue_recovery,
    })
}

/// Order when stock < threshold, regardless of expiry.
fn restock(record: &MedicineRecord, rules: &RestockRules) -> Option<RestockOrder> {
    if record.stock() >= rules.threshold {
        return None;
    }
    tracing::debug!(medicine = record.name(), stock = record.stock(), "restock order");

    Some(RestockOrder {
        medicine: record.name().to_string(),
        recommended_qty: rules.quantity,
        supplier: rules.default_supplier.clone(),
        estimated_cost: rules.estimated_cost,
    })
}

// Saturates instead of panicking on absurd stock figures.
fn scaled(value: Decimal, factor: Decimal) -> Decimal {
    value.checked_mul(factor).unwrap_or(Decimal::MAX)
}

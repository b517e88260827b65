use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    Critical,
    High,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urgency::Critical => write!(f, "CRITICAL"),
            Urgency::High => write!(f, "HIGH"),
        }
    }
}

/// An item whose remaining shelf life falls inside the alert window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryAlert {
    pub medicine: String,
    pub days_left: i64,
    pub stock: u64,
    pub urgency: Urgency,
}

/// A suggested markdown for an item unlikely to sell through before expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRecommendation {
    pub medicine: String,
    pub discount_percent: u32,
    pub expected_clear_pct: u32,
    /// floor(stock x revenue_recovery_ratio x 100).
    pub revenue_recovery: u64,
}

/// A suggested reorder for an item below the stock floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockOrder {
    pub medicine: String,
    pub recommended_qty: u32,
    pub supplier: String,
    pub estimated_cost: u64,
}

/// What one record contributes to the report. Each category is independent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordEvaluation {
    pub expiry_alert: Option<ExpiryAlert>,
    pub discount: Option<DiscountRecommendation>,
    pub restock: Option<RestockOrder>,
}

/// Full result of one scan. Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationReport {
    /// The reference instant every date computation in the scan used.
    pub timestamp: NaiveDateTime,
    pub expiry_alerts: Vec<ExpiryAlert>,
    pub discount_recommendations: Vec<DiscountRecommendation>,
    pub restock_orders: Vec<RestockOrder>,
}

impl RecommendationReport {
    pub fn empty(timestamp: NaiveDateTime) -> Self {
        RecommendationReport {
            timestamp,
            expiry_alerts: Vec::new(),
            discount_recommendations: Vec::new(),
            restock_orders: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.expiry_alerts.is_empty()
            && self.discount_recommendations.is_empty()
            && self.restock_orders.is_empty()
    }
}

/// Appends evaluations in input order, keeping one entry per medicine name
/// per category.
#[derive(Debug)]
pub(crate) struct ReportBuilder {
    report: RecommendationReport,
    alerted: HashSet<String>,
    discounted: HashSet<String>,
    ordered: HashSet<String>,
}

impl ReportBuilder {
    pub(crate) fn new(timestamp: NaiveDateTime) -> Self {
        ReportBuilder {
            report: RecommendationReport::empty(timestamp),
            alerted: HashSet::new(),
            discounted: HashSet::new(),
            ordered: HashSet::new(),
        }
    }

    pub(crate) fn push(&mut self, evaluation: RecordEvaluation) {
        if let Some(alert) = evaluation.expiry_alert {
            if first_time(&mut self.alerted, &alert.medicine, "expiry alert") {
                self.report.expiry_alerts.push(alert);
            }
        }
        if let Some(discount) = evaluation.discount {
            if first_time(&mut self.discounted, &discount.medicine, "discount") {
                self.report.discount_recommendations.push(discount);
            }
        }
        if let Some(order) = evaluation.restock {
            if first_time(&mut self.ordered, &order.medicine, "restock order") {
                self.report.restock_orders.push(order);
            }
        }
    }

    pub(crate) fn finish(self) -> RecommendationReport {
        self.report
    }
}

fn first_time(seen: &mut HashSet<String>, medicine: &str, category: &str) -> bool {
    if seen.insert(medicine.to_string()) {
        true
    } else {
        tracing::warn!(medicine, category, "duplicate medicine name, keeping first entry");
        false
    }
}

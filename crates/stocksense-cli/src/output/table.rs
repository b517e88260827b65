use stocksense_core::engine::RecommendationReport;

pub fn print(report: &RecommendationReport) {
    println!("Inventory scan at {}\n", report.timestamp.format("%Y-%m-%d %H:%M"));

    if report.is_empty() {
        println!("  No recommendations.");
        return;
    }

    println!("=== Expiry alerts ({}) ===\n", report.expiry_alerts.len());
    if !report.expiry_alerts.is_empty() {
        let width = name_width(report.expiry_alerts.iter().map(|a| a.medicine.as_str()));
        for alert in &report.expiry_alerts {
            println!(
                "  {:<width$}  {:>4} days  stock {:>6}  {}",
                alert.medicine, alert.days_left, alert.stock, alert.urgency
            );
        }
        println!();
    }

    println!(
        "=== Discount recommendations ({}) ===\n",
        report.discount_recommendations.len()
    );
    if !report.discount_recommendations.is_empty() {
        let width = name_width(
            report
                .discount_recommendations
                .iter()
                .map(|d| d.medicine.as_str()),
        );
        for d in &report.discount_recommendations {
            println!(
                "  {:<width$}  {:>3}% off  clears ~{}%  recovers {}",
                d.medicine, d.discount_percent, d.expected_clear_pct, d.revenue_recovery
            );
        }
        println!();
    }

    println!("=== Restock orders ({}) ===\n", report.restock_orders.len());
    if !report.restock_orders.is_empty() {
        let width = name_width(report.restock_orders.iter().map(|o| o.medicine.as_str()));
        for order in &report.restock_orders {
            println!(
                "  {:<width$}  qty {:>5}  from {}  (est. {})",
                order.medicine, order.recommended_qty, order.supplier, order.estimated_cost
            );
        }
    }
}

fn name_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
    names.map(|n| n.chars().count()).max().unwrap_or(10)
}

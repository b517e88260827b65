use stocksense_core::engine::RecommendationReport;
use stocksense_core::error::StockSenseError;

pub fn print(report: &RecommendationReport) -> Result<(), StockSenseError> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

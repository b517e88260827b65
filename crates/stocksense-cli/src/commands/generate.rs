use std::path::Path;

use chrono::{Days, Local, NaiveDate};
use stocksense_core::error::StockSenseError;
use stocksense_core::guard;
use stocksense_core::model::REQUIRED_COLUMNS;

/// Write `count` synthetic rows, spread over a year of expiry dates.
pub fn run(count: usize, out: &Path, input_root: &Path) -> Result<(), StockSenseError> {
    let path = guard::resolve(out, input_root)?;
    let failure = |reason: String| StockSenseError::WriteFailure {
        path: path.clone(),
        reason,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| failure(e.to_string()))?;
    }
    let mut writer = csv::Writer::from_path(&path).map_err(|e| failure(e.to_string()))?;
    writer
        .write_record(REQUIRED_COLUMNS)
        .map_err(|e| failure(e.to_string()))?;

    let today = Local::now().date_naive();
    for i in 0..count {
        writer
            .write_record(synthetic_row(i, today))
            .map_err(|e| failure(e.to_string()))?;
    }
    writer.flush().map_err(|e| failure(e.to_string()))?;

    tracing::info!(path = %path.display(), rows = count, "generated synthetic inventory");
    println!("Wrote {count} rows to {}", path.display());
    Ok(())
}

fn synthetic_row(i: usize, today: NaiveDate) -> [String; 4] {
    let expiry = today
        .checked_add_days(Days::new((i % 365) as u64))
        .unwrap_or(today);
    [
        format!("Medicine_{i}"),
        (100 + i % 200).to_string(),
        expiry.format("%Y-%m-%d").to_string(),
        (5 + i % 10).to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_cycle_through_the_year() {
        let today = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert_eq!(
            synthetic_row(0, today),
            ["Medicine_0", "100", "2023-01-01", "5"].map(String::from)
        );
        assert_eq!(
            synthetic_row(366, today),
            ["Medicine_366", "266", "2023-01-02", "11"].map(String::from)
        );
    }
}

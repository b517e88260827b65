pub mod evaluate;
pub mod outcome;

pub use evaluate::evaluate_record;
pub use outcome::{
    DiscountRecommendation, ExpiryAlert, RecommendationReport, RecordEvaluation, RestockOrder,
    Urgency,
};

use crate::error::StockSenseError;
use crate::model::{InventoryRow, MedicineRecord, REQUIRED_COLUMNS};
use crate::rules::schema::RuleConfig;
use crate::source::InventoryTable;
use chrono::NaiveDateTime;
use outcome::ReportBuilder;
use std::num::NonZeroUsize;

/// The instant a scan should use as "now": local wall-clock time.
pub fn reference_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Evaluates inventory tables against one immutable [`RuleConfig`].
///
/// Engines hold no mutable state, so one instance can serve any number of
/// concurrent scans.
#[derive(Debug, Clone, Default)]
pub struct InventoryEngine {
    config: RuleConfig,
}

impl InventoryEngine {
    pub fn new(config: RuleConfig) -> Self {
        InventoryEngine { config }
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Evaluate a single validated record.
    pub fn evaluate(&self, record: &MedicineRecord, reference: NaiveDateTime) -> RecordEvaluation {
        evaluate_record(record, &self.config, reference)
    }

    /// Scan a table row by row.
    ///
    /// Fails with [`StockSenseError::Schema`] if a required column is not
    /// declared. Rows that fail validation are logged and skipped.
    pub fn scan<T: InventoryTable + ?Sized>(
        &self,
        table: &T,
        reference: NaiveDateTime,
    ) -> Result<RecommendationReport, StockSenseError> {
        check_schema(table.columns())?;
        tracing::info!(rows = table.rows().len(), %reference, "starting inventory scan");

        let evaluations = table
            .rows()
            .iter()
            .enumerate()
            .map(|(index, row)| self.evaluate_row(row, index, reference));
        Ok(assemble(evaluations, reference))
    }

    /// Scan a table with rows split across `shards` scoped threads.
    ///
    /// Produces exactly the report [`InventoryEngine::scan`] would: shards
    /// are re-joined in input order before the report is assembled.
    pub fn scan_sharded<T>(
        &self,
        table: &T,
        reference: NaiveDateTime,
        shards: NonZeroUsize,
    ) -> Result<RecommendationReport, StockSenseError>
    where
        T: InventoryTable + ?Sized,
        T::Row: Sync,
    {
        check_schema(table.columns())?;
        let rows = table.rows();
        tracing::info!(rows = rows.len(), shards = shards.get(), %reference, "starting sharded inventory scan");

        let shard_len = rows.len().div_ceil(shards.get()).max(1);
        let evaluated: Vec<Vec<Option<RecordEvaluation>>> = std::thread::scope(|scope| {
            let handles: Vec<_> = rows
                .chunks(shard_len)
                .enumerate()
                .map(|(shard, chunk)| {
                    let offset = shard * shard_len;
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .enumerate()
                            .map(|(i, row)| self.evaluate_row(row, offset + i, reference))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        });

        Ok(assemble(evaluated.into_iter().flatten(), reference))
    }

    fn evaluate_row<R: InventoryRow + ?Sized>(
        &self,
        row: &R,
        index: usize,
        reference: NaiveDateTime,
    ) -> Option<RecordEvaluation> {
        match MedicineRecord::from_row(row) {
            Ok(record) => Some(self.evaluate(&record, reference)),
            Err(err) => {
                tracing::warn!(
                    row = index + 1,
                    field = %err.field,
                    reason = %err.reason,
                    "skipping invalid inventory row"
                );
                None
            }
        }
    }
}

/// Require every column in [`REQUIRED_COLUMNS`]. Extra columns are fine.
pub fn check_schema(columns: &[String]) -> Result<(), StockSenseError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|c| c == *required))
        .map(|required| required.to_string())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    tracing::error!(?missing, expected = ?REQUIRED_COLUMNS, "inventory missing required columns");
    Err(StockSenseError::Schema { missing })
}

fn assemble(
    evaluations: impl Iterator<Item = Option<RecordEvaluation>>,
    reference: NaiveDateTime,
) -> RecommendationReport {
    let mut builder = ReportBuilder::new(reference);
    let mut skipped = 0usize;
    for evaluation in evaluations {
        match evaluation {
            Some(evaluation) => builder.push(evaluation),
            None => skipped += 1,
        }
    }

    let report = builder.finish();
    tracing::info!(
        expiry_alerts = report.expiry_alerts.len(),
        discount_recommendations = report.discount_recommendations.len(),
        restock_orders = report.restock_orders.len(),
        skipped_rows = skipped,
        "scan complete"
    );
    report
}

pub mod engine;
pub mod error;
pub mod guard;
pub mod model;
pub mod parsing;
pub mod rules;
pub mod source;
pub mod writer;

use std::num::NonZeroUsize;
use std::path::Path;

use chrono::NaiveDateTime;

use engine::{InventoryEngine, RecommendationReport};
use error::StockSenseError;

/// Main API entry point: scan an inventory file that must live under
/// `input_root`.
///
/// The path is checked by the guard before anything is opened. CSV and
/// spreadsheet files are both accepted; see [`source::load_table`].
pub fn scan_inventory_file(
    inventory_file: &Path,
    input_root: &Path,
    engine: &InventoryEngine,
    reference: NaiveDateTime,
) -> Result<RecommendationReport, StockSenseError> {
    scan_inventory_file_sharded(inventory_file, input_root, engine, reference, NonZeroUsize::MIN)
}

/// [`scan_inventory_file`] with rows evaluated on `shards` threads.
///
/// One shard runs [`InventoryEngine::scan`]; more run
/// [`InventoryEngine::scan_sharded`]. Both produce the same report.
pub fn scan_inventory_file_sharded(
    inventory_file: &Path,
    input_root: &Path,
    engine: &InventoryEngine,
    reference: NaiveDateTime,
    shards: NonZeroUsize,
) -> Result<RecommendationReport, StockSenseError> {
    let path = guard::resolve(inventory_file, input_root)?;

    let table = source::load_table(&path).inspect_err(|err| {
        tracing::error!(path = %path.display(), error = %err, "failed to load inventory");
    })?;

    let report = if shards.get() > 1 {
        engine.scan_sharded(&table, reference, shards)
    } else {
        engine.scan(&table, reference)
    };
    report.inspect_err(|err| {
        tracing::error!(path = %path.display(), error = %err, "inventory rejected");
    })
}

use std::num::NonZeroUsize;
use std::path::PathBuf;

use stocksense_core::engine::{reference_now, InventoryEngine};
use stocksense_core::error::StockSenseError;
use stocksense_core::rules::{load_config, RuleConfig};
use stocksense_core::writer;

use crate::output;

pub struct ScanArgs {
    pub input_file: PathBuf,
    /// `None` when saving is disabled.
    pub save_to: Option<PathBuf>,
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub config: Option<PathBuf>,
    pub output_format: String,
    pub threads: usize,
}

pub fn run(args: ScanArgs) -> Result<(), StockSenseError> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RuleConfig::default(),
    };
    let engine = InventoryEngine::new(config);
    let reference = reference_now();

    let shards = NonZeroUsize::new(args.threads).unwrap_or(NonZeroUsize::MIN);
    let report = stocksense_core::scan_inventory_file_sharded(
        &args.input_file,
        &args.input_root,
        &engine,
        reference,
        shards,
    )?;

    match args.output_format.as_str() {
        "json" => output::json::print(&report)?,
        _ => output::table::print(&report),
    }

    if let Some(destination) = &args.save_to {
        let saved = writer::write_report(&report, destination, &args.output_root)?;
        if args.output_format != "json" {
            println!("\nSaved to {}", saved.display());
        }
    }
    Ok(())
}

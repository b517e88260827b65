mod commands;
mod logging;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "stocksense",
    version,
    about = "Expiry alerts, discount suggestions and restock orders for pharmacy inventory"
)]
struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan an inventory file (CSV or XLSX) and report recommendations
    Scan {
        /// Inventory file; must live under the input root
        #[arg(env = "INVENTORY_FILE", default_value = "data/sample_inventory.csv")]
        input_file: PathBuf,

        /// Where to save the JSON report; must live under the output root
        #[arg(
            long = "save-to",
            value_name = "FILE",
            env = "OUTPUT_FILE",
            default_value = "output/recommendations.json"
        )]
        save_to: PathBuf,

        /// Directory inventory files may be read from
        #[arg(long, value_name = "DIR", default_value = "data")]
        input_root: PathBuf,

        /// Directory reports may be written to
        #[arg(long, value_name = "DIR", default_value = "output")]
        output_root: PathBuf,

        /// JSON file with rule overrides
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Print only; do not save the report
        #[arg(long)]
        no_save: bool,

        /// Evaluate rows on this many threads
        #[arg(long, value_name = "N", default_value_t = 1)]
        threads: usize,
    },
    /// Inspect and check rule configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Write a synthetic inventory CSV for load testing
    Generate {
        /// Number of rows
        #[arg(short, long, default_value_t = 10_000)]
        count: usize,

        /// Destination file; must live under the input root
        #[arg(long = "out", value_name = "FILE", default_value = "data/generated_inventory.csv")]
        out: PathBuf,

        /// Directory the file may be written to
        #[arg(long, value_name = "DIR", default_value = "data")]
        input_root: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration (defaults plus overrides) as JSON
    Show {
        /// JSON file with rule overrides
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Validate a rule override file
    Validate {
        /// Path to JSON override file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    let result = match cli.command {
        Commands::Scan {
            input_file,
            save_to,
            input_root,
            output_root,
            config,
            output,
            no_save,
            threads,
        } => commands::scan::run(commands::scan::ScanArgs {
            input_file,
            save_to: (!no_save).then_some(save_to),
            input_root,
            output_root,
            config,
            output_format: output,
            threads,
        }),
        Commands::Config { action } => match action {
            ConfigAction::Show { config } => commands::config::show(config.as_deref()),
            ConfigAction::Validate { file } => commands::config::validate(&file),
        },
        Commands::Generate {
            count,
            out,
            input_root,
        } => commands::generate::run(count, &out, &input_root),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

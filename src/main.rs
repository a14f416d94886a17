//! Collection Sync - MTG collection price updater
//!
//! Updates card prices in an Excel collection sheet from the Scryfall
//! API and maintains the sheet's total collection value.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use collection_sync::{run_update, CollectionError, RunConfig, RunMode};

/// Updates card prices in an Excel collection sheet from Scryfall
#[derive(Parser, Debug)]
#[command(name = "collection_sync")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the collection workbook
    #[arg(short, long, default_value = "mtg_collection.xlsx")]
    file: PathBuf,

    /// Sheet name to update (prompted for when omitted)
    #[arg(short, long)]
    sheet: Option<String>,

    /// Run mode: all, checked, aged, empty (prompted for when omitted)
    #[arg(short, long)]
    mode: Option<String>,

    /// Card API base URL
    #[arg(long, default_value = collection_sync::SCRYFALL_API_URL)]
    api_url: String,
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn main() {
    // Initialize logger. Set RUST_LOG environment variable to control log level.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let sheet_name = match args.sheet {
        Some(sheet) => sheet,
        None => match prompt("Enter the sheet name to use: ") {
            Ok(sheet) => sheet,
            Err(e) => {
                eprintln!("Error: failed to read input: {}", e);
                std::process::exit(1);
            }
        },
    };

    let mode_input = match args.mode {
        Some(mode) => mode,
        None => match prompt("Enter run mode (all, checked, aged, empty): ") {
            Ok(mode) => mode,
            Err(e) => {
                eprintln!("Error: failed to read input: {}", e);
                std::process::exit(1);
            }
        },
    };

    // Validate the mode before anything touches the network
    let mode = match RunMode::parse(&mode_input) {
        Some(mode) => mode,
        None => {
            eprintln!("{}", CollectionError::InvalidRunMode(mode_input));
            std::process::exit(1);
        }
    };

    let mut config = RunConfig::new(args.file, sheet_name, mode);
    config.api_base_url = args.api_url;

    log::info!(
        "Starting collection sync: {} (sheet: {}, mode: {})",
        config.workbook_path.display(),
        config.sheet_name,
        mode.as_str()
    );

    match run_update(&config) {
        Ok(summary) => {
            if summary.rows_missed > 0 {
                log::warn!("{} cards had no resolvable price", summary.rows_missed);
            }
            println!(
                "Updated {} successfully. {} cards refreshed. Total collection value: ${:.2}",
                config.sheet_name, summary.rows_updated, summary.total_value
            );
        }
        Err(e) => {
            log::error!("Run failed: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

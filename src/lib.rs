//! Collection Sync - MTG Collection Valuation
//!
//! Reads card rows from an Excel collection sheet, looks up current USD
//! prices on Scryfall (exact lookup with fuzzy fallback), writes the
//! prices back, and keeps a running "TOTAL VALUE" aggregate in the
//! sheet's reserved header cells.

pub mod error;
pub mod models;
pub mod resolver;
pub mod scryfall;
pub mod selector;
pub mod update;
pub mod workbook;

// Re-export commonly used items
pub use error::{CollectionError, Result};
pub use models::{CollectionRow, Price, RunMode};
pub use resolver::PriceResolver;
pub use scryfall::{ScryfallCard, SCRYFALL_API_URL};
pub use selector::select_rows;
pub use update::{run_update, RunConfig, UpdateSummary};
pub use workbook::{load_sheet, save_sheet, LockRetry, EXPECTED_COLUMNS, TOTAL_LABEL};

//! Update orchestration: load, select, resolve, aggregate, write back.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveDate};

use crate::error::Result;
use crate::models::{CollectionRow, Price, RunMode};
use crate::resolver::{PriceResolver, REQUEST_DELAY};
use crate::scryfall::SCRYFALL_API_URL;
use crate::selector::select_rows;
use crate::workbook::{load_sheet, save_sheet, LockRetry};

/// Everything one run needs; passed explicitly instead of living in
/// module-level globals.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub workbook_path: PathBuf,
    pub sheet_name: String,
    pub mode: RunMode,
    pub api_base_url: String,
    pub request_delay: Duration,
    pub lock_retry: LockRetry,
}

impl RunConfig {
    pub fn new(workbook_path: PathBuf, sheet_name: String, mode: RunMode) -> Self {
        Self {
            workbook_path,
            sheet_name,
            mode,
            api_base_url: SCRYFALL_API_URL.to_string(),
            request_delay: REQUEST_DELAY,
            lock_retry: LockRetry::default(),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateSummary {
    /// Rows that received a fresh numeric price.
    pub rows_updated: usize,
    /// Rows that ended the run with the "Not Found" marker.
    pub rows_missed: usize,
    /// Aggregate value over the whole collection.
    pub total_value: f64,
}

/// Run a full update cycle over the configured sheet.
///
/// Rows are processed strictly in sheet order, one provider request
/// outstanding at a time. Unselected rows pass through untouched. The
/// aggregate is recomputed over every row, selected or not, and written
/// into the reserved header cells.
pub fn run_update(config: &RunConfig) -> Result<UpdateSummary> {
    let mut rows = load_sheet(&config.workbook_path, &config.sheet_name)?;
    log::info!(
        "Loaded {} rows from sheet '{}'",
        rows.len(),
        config.sheet_name
    );

    let today = Local::now().date_naive();
    let resolver = PriceResolver::with_delay(&config.api_base_url, config.request_delay);

    let summary = refresh_rows(&mut rows, &resolver, config.mode, today);

    save_sheet(
        &config.workbook_path,
        &config.sheet_name,
        &rows,
        summary.total_value,
        config.lock_retry,
    )?;

    Ok(summary)
}

/// Resolve prices for the rows `mode` selects and recompute the
/// aggregate. Split out from `run_update` so tests can drive it against
/// an in-memory row set and a mock provider.
pub fn refresh_rows(
    rows: &mut [CollectionRow],
    resolver: &PriceResolver,
    mode: RunMode,
    today: NaiveDate,
) -> UpdateSummary {
    let selected = select_rows(rows, mode, today);
    if !selected.is_empty() {
        log::info!("Updating {} cards (mode: {})", selected.len(), mode.as_str());
    }

    let mut rows_updated = 0;
    let mut rows_missed = 0;

    for index in selected {
        let row = &mut rows[index];
        log::info!(
            "Searching for: {} (set: {}, set #: {})",
            row.name,
            row.set_code.as_deref().unwrap_or("any"),
            row.set_number.as_deref().unwrap_or("any")
        );

        let price = match resolver.resolve(
            &row.name,
            row.set_code.as_deref(),
            row.set_number.as_deref(),
        ) {
            Ok(price) => price,
            Err(e) => {
                // A transport failure degrades the row rather than
                // aborting the remaining rows of the run.
                log::warn!("Lookup failed for '{}': {}", row.name, e);
                Price::NotFound
            }
        };

        row.apply_price(price, today);
        match price {
            Price::Known(_) => rows_updated += 1,
            Price::NotFound => rows_missed += 1,
        }
    }

    UpdateSummary {
        rows_updated,
        rows_missed,
        total_value: collection_total(rows),
    }
}

/// Sum of all rows' total price, counting "Not Found" as zero.
pub fn collection_total(rows: &[CollectionRow]) -> f64 {
    rows.iter().map(|row| row.total_price.or_zero()).sum()
}

#[cfg(test)]
#[path = "update_tests.rs"]
mod tests;

//! Row selection: which collection rows get a price refresh this run.

use chrono::NaiveDate;

use crate::models::{CollectionRow, Price, RunMode};

/// Rows older than this many days are eligible under `aged` mode.
pub const AGED_THRESHOLD_DAYS: i64 = 30;

/// Returns the indices of rows eligible for refresh under `mode`.
///
/// Under `aged`, rows with no recorded update date are excluded: an
/// undated row is unknown-age, not infinitely old.
pub fn select_rows(rows: &[CollectionRow], mode: RunMode, today: NaiveDate) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| is_eligible(row, mode, today))
        .map(|(i, _)| i)
        .collect()
}

fn is_eligible(row: &CollectionRow, mode: RunMode, today: NaiveDate) -> bool {
    match mode {
        RunMode::All => true,
        RunMode::Checked => row.include,
        RunMode::Aged => match row.last_updated {
            Some(updated) => (today - updated).num_days() > AGED_THRESHOLD_DAYS,
            None => false,
        },
        RunMode::Empty => row.price == Price::NotFound,
    }
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;

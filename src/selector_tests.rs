//! Tests for row selection policies.

use chrono::NaiveDate;

use crate::models::{CollectionRow, Price, RunMode};
use crate::selector::select_rows;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn row(name: &str) -> CollectionRow {
    CollectionRow {
        include: false,
        name: name.to_string(),
        set_code: None,
        set_number: None,
        quantity: 1,
        price: Price::NotFound,
        total_price: Price::NotFound,
        last_updated: None,
    }
}

#[test]
fn mode_all_selects_everything() {
    let rows = vec![row("a"), row("b"), row("c")];
    let selected = select_rows(&rows, RunMode::All, date(2026, 8, 30));
    assert_eq!(selected, vec![0, 1, 2]);
}

#[test]
fn mode_checked_selects_flagged_rows_only() {
    let mut rows = vec![row("a"), row("b"), row("c")];
    rows[1].include = true;

    let selected = select_rows(&rows, RunMode::Checked, date(2026, 8, 30));
    assert_eq!(selected, vec![1]);
}

#[test]
fn mode_aged_selects_rows_older_than_30_days() {
    let today = date(2026, 8, 30);
    let mut rows = vec![row("old"), row("recent"), row("boundary")];
    rows[0].last_updated = Some(date(2026, 6, 1)); // 90 days old
    rows[1].last_updated = Some(date(2026, 8, 20)); // 10 days old
    rows[2].last_updated = Some(date(2026, 7, 31)); // exactly 30 days

    let selected = select_rows(&rows, RunMode::Aged, today);
    // Strictly greater than 30 days: the boundary row stays out
    assert_eq!(selected, vec![0]);
}

#[test]
fn mode_aged_excludes_rows_with_no_date() {
    // An undated row is unknown-age, never "infinitely aged"
    let rows = vec![row("undated")];
    let selected = select_rows(&rows, RunMode::Aged, date(2026, 8, 30));
    assert!(selected.is_empty());
}

#[test]
fn mode_empty_selects_not_found_and_skips_priced() {
    let mut rows = vec![row("missing"), row("priced")];
    rows[1].price = Price::Known(12.50);

    let selected = select_rows(&rows, RunMode::Empty, date(2026, 8, 30));
    assert_eq!(selected, vec![0]);
}

#[test]
fn mode_empty_treats_zero_price_as_present() {
    // A $0.00 card has a known price and is not refreshed under `empty`
    let mut rows = vec![row("zero")];
    rows[0].price = Price::Known(0.0);

    let selected = select_rows(&rows, RunMode::Empty, date(2026, 8, 30));
    assert!(selected.is_empty());
}

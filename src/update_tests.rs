//! Tests for the update orchestration over in-memory rows.

use std::time::Duration;

use chrono::NaiveDate;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{collection_total, refresh_rows};
use crate::models::{CollectionRow, Price, RunMode};
use crate::resolver::PriceResolver;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn row(name: &str, quantity: u32, price: Price) -> CollectionRow {
    let total = match price {
        Price::Known(v) => Price::Known(v * quantity as f64),
        Price::NotFound => Price::NotFound,
    };
    CollectionRow {
        include: false,
        name: name.to_string(),
        set_code: None,
        set_number: None,
        quantity,
        price,
        total_price: total,
        last_updated: None,
    }
}

fn card_json(name: &str, usd: &str) -> serde_json::Value {
    serde_json::json!({ "name": name, "prices": { "usd": usd } })
}

// ── collection_total ─────────────────────────────────────────────────

#[test]
fn total_sums_known_totals_and_zeroes_not_found() {
    let rows = vec![
        row("a", 4, Price::Known(0.10)),
        row("b", 1, Price::NotFound),
        row("c", 2, Price::Known(5.00)),
    ];

    assert_eq!(collection_total(&rows), 0.4 + 10.0);
}

#[test]
fn total_is_idempotent() {
    let rows = vec![
        row("a", 3, Price::Known(1.50)),
        row("b", 1, Price::NotFound),
    ];

    let first = collection_total(&rows);
    let second = collection_total(&rows);
    assert_eq!(first, second);
}

#[test]
fn total_of_empty_collection_is_zero() {
    assert_eq!(collection_total(&[]), 0.0);
}

// ── refresh_rows ─────────────────────────────────────────────────────

#[tokio::test]
async fn empty_mode_refreshes_only_unpriced_rows() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards/named"))
        .and(query_param("exact", "Island"))
        .and(query_param("set", "m21"))
        .respond_with(ResponseTemplate::new(200).set_body_json(card_json("Island", "0.10")))
        .mount(&mock_server)
        .await;

    let mut rows = vec![
        {
            let mut r = row("Island", 4, Price::NotFound);
            r.set_code = Some("M21".to_string());
            r
        },
        row("Black Lotus", 1, Price::Known(15000.0)),
    ];
    let untouched_before = rows[1].clone();

    let today = date(2026, 8, 30);
    let base_url = mock_server.uri();
    let summary = tokio::task::spawn_blocking(move || {
        let resolver = PriceResolver::with_delay(&base_url, Duration::ZERO);
        let summary = refresh_rows(&mut rows, &resolver, RunMode::Empty, today);
        (summary, rows)
    })
    .await
    .unwrap();
    let (summary, rows) = summary;

    assert_eq!(rows[0].price, Price::Known(0.10));
    assert_eq!(rows[0].total_price, Price::Known(0.4));
    assert_eq!(rows[0].last_updated, Some(today));

    // Unselected row passes through untouched, date included
    assert_eq!(rows[1], untouched_before);

    assert_eq!(summary.rows_updated, 1);
    assert_eq!(summary.rows_missed, 0);
    assert_eq!(summary.total_value, 0.4 + 15000.0);
}

#[tokio::test]
async fn unresolvable_card_ends_with_not_found_in_both_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards/named"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cards/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] })))
        .mount(&mock_server)
        .await;

    let mut rows = vec![row("Nonexistent Card XYZ", 1, Price::Known(1.0))];

    let today = date(2026, 8, 30);
    let base_url = mock_server.uri();
    let (summary, rows) = tokio::task::spawn_blocking(move || {
        let resolver = PriceResolver::with_delay(&base_url, Duration::ZERO);
        let summary = refresh_rows(&mut rows, &resolver, RunMode::All, today);
        (summary, rows)
    })
    .await
    .unwrap();

    assert_eq!(rows[0].price, Price::NotFound);
    assert_eq!(rows[0].total_price, Price::NotFound);
    assert_eq!(summary.rows_updated, 0);
    assert_eq!(summary.rows_missed, 1);
    assert_eq!(summary.total_value, 0.0);
}

#[tokio::test]
async fn transport_failure_degrades_the_row_and_continues() {
    // Nothing listens here: every lookup is a connection error
    let mut rows = vec![
        row("First", 1, Price::Known(5.0)),
        row("Second", 2, Price::Known(3.0)),
    ];

    let today = date(2026, 8, 30);
    let (summary, rows) = tokio::task::spawn_blocking(move || {
        let resolver = PriceResolver::with_delay("http://127.0.0.1:1", Duration::ZERO);
        let summary = refresh_rows(&mut rows, &resolver, RunMode::All, today);
        (summary, rows)
    })
    .await
    .unwrap();

    // Both rows were attempted; neither aborted the run
    assert_eq!(rows[0].price, Price::NotFound);
    assert_eq!(rows[1].price, Price::NotFound);
    assert_eq!(summary.rows_missed, 2);
}

#[tokio::test]
async fn aggregate_covers_selected_and_unselected_rows() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards/named"))
        .and(query_param("exact", "Checked Card"))
        .respond_with(ResponseTemplate::new(200).set_body_json(card_json("Checked Card", "2.50")))
        .mount(&mock_server)
        .await;

    let mut rows = vec![
        {
            let mut r = row("Checked Card", 2, Price::NotFound);
            r.include = true;
            r
        },
        row("Idle Card", 3, Price::Known(1.00)),
    ];

    let today = date(2026, 8, 30);
    let base_url = mock_server.uri();
    let (summary, _rows) = tokio::task::spawn_blocking(move || {
        let resolver = PriceResolver::with_delay(&base_url, Duration::ZERO);
        let summary = refresh_rows(&mut rows, &resolver, RunMode::Checked, today);
        (summary, rows)
    })
    .await
    .unwrap();

    assert_eq!(summary.total_value, 5.0 + 3.0);
}

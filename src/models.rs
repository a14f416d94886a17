//! Core data types: collection rows, prices, run modes.

use chrono::NaiveDate;
use std::fmt;

/// Marker string written to the sheet when no price could be determined.
pub const NOT_FOUND_LABEL: &str = "Not Found";

/// Date format used in the "Last Updated" column.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// A resolved (or unresolvable) card price.
///
/// `NotFound` is a distinguished sentinel and is never conflated with a
/// zero-value card: a card the provider knows but prices at $0.00 is
/// `Known(0.0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Price {
    Known(f64),
    NotFound,
}

impl Price {
    /// Numeric value for aggregation; `NotFound` counts as 0.
    pub fn or_zero(&self) -> f64 {
        match self {
            Price::Known(v) => *v,
            Price::NotFound => 0.0,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Price::Known(_))
    }

    /// Parse a price cell value: a number, a numeric string, the
    /// "Not Found" marker, or blank. Prices are non-negative; a
    /// negative cell reads as the sentinel.
    pub fn parse_cell(raw: &str) -> Price {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NOT_FOUND_LABEL) {
            return Price::NotFound;
        }
        match trimmed.trim_start_matches('$').parse::<f64>() {
            Ok(v) if v >= 0.0 => Price::Known(v),
            _ => Price::NotFound,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Known(v) => write!(f, "{:.2}", v),
            Price::NotFound => write!(f, "{}", NOT_FOUND_LABEL),
        }
    }
}

/// Row-eligibility policy for a run. Parsed from user input against a
/// closed set; anything else is a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Every row is refreshed.
    All,
    /// Only rows with the "Run" checkbox set.
    Checked,
    /// Only rows whose last update is more than 30 days old.
    Aged,
    /// Only rows with no price or the "Not Found" marker.
    Empty,
}

impl RunMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Some(RunMode::All),
            "checked" => Some(RunMode::Checked),
            "aged" => Some(RunMode::Aged),
            "empty" => Some(RunMode::Empty),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::All => "all",
            RunMode::Checked => "checked",
            RunMode::Aged => "aged",
            RunMode::Empty => "empty",
        }
    }
}

/// One tracked card in the collection sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionRow {
    /// "Run" column: force a refresh of this row in `checked` mode.
    pub include: bool,
    pub name: String,
    /// Set code as stored in the sheet; normalized only when submitted
    /// to the provider.
    pub set_code: Option<String>,
    /// Collector number within the set.
    pub set_number: Option<String>,
    pub quantity: u32,
    pub price: Price,
    /// Always `Known(price * quantity)` when `price` is known, otherwise
    /// `NotFound`.
    pub total_price: Price,
    pub last_updated: Option<NaiveDate>,
}

impl CollectionRow {
    /// Apply a freshly resolved price, keeping `total_price` consistent
    /// and stamping the update date.
    pub fn apply_price(&mut self, price: Price, today: NaiveDate) {
        self.price = price;
        self.total_price = match price {
            Price::Known(v) => Price::Known(v * self.quantity as f64),
            Price::NotFound => Price::NotFound,
        };
        self.last_updated = Some(today);
    }
}

/// Normalize a set code for provider queries: lowercase, internal spaces
/// stripped ("Modern Horizons 2" becomes "modernhorizons2").
pub fn normalize_set_code(code: &str) -> String {
    code.trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Parse a quantity cell, defaulting to 1 when missing or unparseable.
pub fn parse_quantity(raw: &str) -> u32 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 1;
    }
    // Sheets often store integers as "4.0"
    match trimmed.parse::<f64>() {
        Ok(v) if v >= 0.0 => v as u32,
        _ => 1,
    }
}

/// Parse a "Last Updated" cell in MM/DD/YYYY format.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Parse a "Run" flag cell: booleans, "true"/"false", or 0/1.
pub fn parse_flag(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed == "1" || trimmed.eq_ignore_ascii_case("true")
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

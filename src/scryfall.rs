//! Scryfall API client for card price lookups.
//!
//! Two read-only endpoints are used: `/cards/named` for exact-name lookups
//! and `/cards/search` for free-text fallback queries. No authentication.

use crate::error::Result;
use serde::Deserialize;

/// Public Scryfall API base URL.
pub const SCRYFALL_API_URL: &str = "https://api.scryfall.com";

const USER_AGENT: &str = "CollectionSync/1.0";

/// Scryfall card response (price fields only; the rest is ignored).
#[derive(Debug, Deserialize, Clone)]
pub struct ScryfallCard {
    pub name: String,
    #[serde(default)]
    pub prices: ScryfallPrices,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ScryfallPrices {
    pub usd: Option<String>,
    pub usd_foil: Option<String>,
    pub eur: Option<String>,
}

impl ScryfallCard {
    /// USD price as a number. An absent or non-numeric `prices.usd` field
    /// reads as 0.0, matching long-standing sheet behavior: a card the
    /// provider lists without a USD price is recorded as $0.00, not as
    /// missing.
    pub fn usd_price(&self) -> f64 {
        self.prices
            .usd
            .as_deref()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0)
    }
}

/// Envelope for `/cards/search` list responses.
#[derive(Debug, Deserialize)]
pub struct ScryfallList {
    #[serde(default)]
    pub data: Vec<ScryfallCard>,
}

/// Outcome of a single provider request: a parsed card (or list), or an
/// HTTP-level miss that the caller degrades to the next fallback step.
/// Transport failures surface as `Err` instead.
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    Miss(reqwest::StatusCode),
}

/// Exact named-card lookup, optionally constrained by set code and
/// collector number. The set code must already be normalized.
pub fn fetch_card_named(
    client: &reqwest::blocking::Client,
    base_url: &str,
    name: &str,
    set_code: Option<&str>,
    collector_number: Option<&str>,
) -> Result<Lookup<ScryfallCard>> {
    let url = format!("{}/cards/named", base_url);

    let mut params: Vec<(&str, &str)> = vec![("exact", name)];
    if let Some(set) = set_code {
        params.push(("set", set));
    }
    if let Some(cn) = collector_number {
        params.push(("collector_number", cn));
    }

    log::debug!("Exact lookup: {} (set: {:?}, cn: {:?})", name, set_code, collector_number);

    let response = client
        .get(&url)
        .query(&params)
        .header("User-Agent", USER_AGENT)
        .send()?;

    if response.status().is_success() {
        let body = response.text()?;
        Ok(Lookup::Found(serde_json::from_str::<ScryfallCard>(&body)?))
    } else {
        Ok(Lookup::Miss(response.status()))
    }
}

/// Free-text search returning provider-ranked matches. Never applies set
/// or collector-number constraints.
pub fn search_cards(
    client: &reqwest::blocking::Client,
    base_url: &str,
    query: &str,
) -> Result<Lookup<Vec<ScryfallCard>>> {
    let url = format!("{}/cards/search", base_url);

    log::debug!("Fuzzy search: {}", query);

    let response = client
        .get(&url)
        .query(&[("q", query)])
        .header("User-Agent", USER_AGENT)
        .send()?;

    if response.status().is_success() {
        let body = response.text()?;
        let list = serde_json::from_str::<ScryfallList>(&body)?;
        Ok(Lookup::Found(list.data))
    } else {
        Ok(Lookup::Miss(response.status()))
    }
}

#[cfg(test)]
#[path = "scryfall_tests.rs"]
mod tests;

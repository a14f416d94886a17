//! Price resolution: exact lookup with fuzzy fallback.

use std::time::Duration;

use crate::error::Result;
use crate::models::{normalize_set_code, Price};
use crate::scryfall::{fetch_card_named, search_cards, Lookup};

/// Minimum delay between provider requests, per Scryfall's usage policy.
pub const REQUEST_DELAY: Duration = Duration::from_millis(100);

/// Resolves card prices against the provider, one request at a time.
///
/// Exact lookups are tried first; an HTTP-level miss falls back to a
/// free-text search and takes the provider's first-ranked result. Only
/// transport failures surface as errors.
pub struct PriceResolver {
    client: reqwest::blocking::Client,
    base_url: String,
    request_delay: Duration,
}

impl PriceResolver {
    pub fn new(base_url: &str) -> Self {
        Self::with_delay(base_url, REQUEST_DELAY)
    }

    /// Resolver with a custom inter-request delay. Tests use zero.
    pub fn with_delay(base_url: &str, request_delay: Duration) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            request_delay,
        }
    }

    /// Resolve a card's USD price.
    ///
    /// The set code is normalized (lowercased, spaces stripped) before
    /// submission. The fuzzy fallback deliberately drops the set and
    /// collector-number constraints: the goal at that point is to find
    /// something plausible, not the exact printing.
    pub fn resolve(
        &self,
        name: &str,
        set_code: Option<&str>,
        set_number: Option<&str>,
    ) -> Result<Price> {
        let normalized_set = set_code.map(normalize_set_code);

        let exact = fetch_card_named(
            &self.client,
            &self.base_url,
            name,
            normalized_set.as_deref(),
            set_number,
        );
        self.throttle();

        match exact? {
            Lookup::Found(card) => return Ok(Price::Known(card.usd_price())),
            Lookup::Miss(status) => {
                log::info!(
                    "Exact lookup failed for '{}' ({}), trying fuzzy search",
                    name,
                    status
                );
            }
        }

        let fuzzy = search_cards(&self.client, &self.base_url, name);
        self.throttle();

        match fuzzy? {
            Lookup::Found(cards) => match cards.first() {
                Some(best_match) => Ok(Price::Known(best_match.usd_price())),
                None => {
                    log::info!("No fuzzy match found for '{}'", name);
                    Ok(Price::NotFound)
                }
            },
            Lookup::Miss(status) => {
                log::info!("Fuzzy search failed for '{}' ({})", name, status);
                Ok(Price::NotFound)
            }
        }
    }

    /// Honored after every request, including fast local failures.
    fn throttle(&self) {
        if !self.request_delay.is_zero() {
            std::thread::sleep(self.request_delay);
        }
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;

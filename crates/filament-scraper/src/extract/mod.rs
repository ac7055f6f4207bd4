//! Best-effort price extraction from vendor product-page markup.
//!
//! Tries strategies in priority order and returns the first hit:
//!
//! 1. schema.org JSON-LD `Product` / `Offer` blocks
//! 2. `product:price:*` / `og:price:*` / `twitter:data1` meta tags
//! 3. a `$NN.NN` amount within 100 characters after the word "price"
//!
//! Scanning is regex-based on purpose: only well-known fixed substrings are
//! targeted, so malformed markup never needs a full HTML parse.

mod jsonld;
mod meta;
mod text;

use filament_core::PriceObservation;

/// Turns raw page markup into a price observation.
///
/// Implementations must be pure: identical markup yields an identical
/// observation, and a miss is an empty observation rather than an error.
pub trait PriceExtractor: Send + Sync {
    fn extract(&self, markup: &str) -> PriceObservation;
}

/// The regex-driven strategy chain described in the module docs.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupExtractor;

impl PriceExtractor for MarkupExtractor {
    fn extract(&self, markup: &str) -> PriceObservation {
        extract_price(markup)
    }
}

/// Run the strategy chain over `markup`.
#[must_use]
pub fn extract_price(markup: &str) -> PriceObservation {
    if let Some(observation) = jsonld::extract_jsonld_price(markup) {
        tracing::trace!("price found in JSON-LD block");
        return observation;
    }

    if let Some(observation) = meta::extract_meta_price(markup) {
        tracing::trace!("price found in meta tags");
        return observation;
    }

    if let Some(observation) = text::extract_text_price(markup) {
        tracing::trace!("price found by text heuristic");
        return observation;
    }

    PriceObservation::default()
}

#[cfg(test)]
#[path = "../extract_test.rs"]
mod tests;

//! Price observations, per-SKU rows, and the snapshot that groups them.
//!
//! The serialized shape is the persisted/served document:
//!
//! ```json
//! { "updatedAt": "...", "rows": [ { "brand": "...", "material": "PLA",
//!   "product": "...", "url": "...", "weightKg": 1.0, "price": 19.99,
//!   "currency": "USD", "scrapedAt": "...", "abrasive": true } ] }
//! ```
//!
//! `price`, `currency`, and `scrapedAt` are omitted when absent; `abrasive`
//! is omitted when false.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogEntry;

/// Currency assumed whenever a page states a price without one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// What the extractor could determine from one page.
///
/// An observation without a `price` means "could not determine", never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl PriceObservation {
    #[must_use]
    pub fn new(price: f64, currency: impl Into<String>) -> Self {
        Self {
            price: Some(price),
            currency: Some(currency.into()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.currency.is_none()
    }
}

/// One catalog entry's observation from a single scrape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<DateTime<Utc>>,
}

impl Row {
    /// Merge a catalog entry with what was observed for it at `scraped_at`.
    #[must_use]
    pub fn observed(
        entry: CatalogEntry,
        observation: PriceObservation,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        Self {
            entry,
            price: observation.price,
            currency: observation.currency,
            scraped_at: Some(scraped_at),
        }
    }

    /// Price normalized to one kilogram of filament, when a price is known.
    #[must_use]
    pub fn price_per_kg(&self) -> Option<f64> {
        self.price.map(|price| price / self.entry.weight_kg)
    }
}

/// One complete scrape of the catalog, rows in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub updated_at: DateTime<Utc>,
    pub rows: Vec<Row>,
}

impl Snapshot {
    /// Number of rows carrying a price.
    #[must_use]
    pub fn priced_count(&self) -> usize {
        self.rows.iter().filter(|row| row.price.is_some()).count()
    }
}

//! Fetches one catalog entry's product page and turns it into a [`Row`].

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use filament_core::{CatalogEntry, PriceObservation, Row};
use reqwest::Client;

use crate::error::ScraperError;
use crate::extract::{MarkupExtractor, PriceExtractor};

/// Result of fetching and parsing one product page.
///
/// Kept distinct for diagnostics; every variant collapses to the same kind of
/// [`Row`], so a failed fetch is indistinguishable downstream from a page
/// with no discoverable price.
#[derive(Debug)]
pub enum FetchOutcome {
    Priced(PriceObservation),
    /// The page loaded but the extractor found no price. Any currency it did
    /// find is kept.
    NoPrice(PriceObservation),
    Failed(ScraperError),
}

impl FetchOutcome {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            FetchOutcome::Priced(_) => "priced",
            FetchOutcome::NoPrice(_) => "no_price",
            FetchOutcome::Failed(_) => "failed",
        }
    }

    /// The observation to publish: failures carry none.
    #[must_use]
    pub fn into_observation(self) -> PriceObservation {
        match self {
            FetchOutcome::Priced(observation) | FetchOutcome::NoPrice(observation) => observation,
            FetchOutcome::Failed(_) => PriceObservation::default(),
        }
    }
}

/// HTTP client plus extractor used to scrape product pages.
///
/// No retries and, unless configured, no request timeout: one attempt per
/// entry per build.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
    extractor: Arc<dyn PriceExtractor>,
}

impl PageFetcher {
    /// Creates a fetcher sending `user_agent` with every request.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::ClientBuild`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(user_agent: &str, timeout_secs: Option<u64>) -> Result<Self, ScraperError> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(ScraperError::ClientBuild)?;
        Ok(Self::with_client(client))
    }

    /// Wraps an existing client, using the default [`MarkupExtractor`].
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            extractor: Arc::new(MarkupExtractor),
        }
    }

    /// Swap in a different extractor implementation.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn PriceExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Download the markup at `url`.
    ///
    /// The status code is not inspected: error pages are returned as markup
    /// like any other body.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Http`] if the request cannot be sent or completed.
    /// - [`ScraperError::Body`] if the body cannot be decoded as text.
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScraperError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url, status = status.as_u16(), "non-success status; parsing body anyway");
        }
        response.text().await.map_err(|source| ScraperError::Body {
            url: url.to_owned(),
            source,
        })
    }

    /// Fetch and extract, keeping the failure reason.
    pub async fn fetch_outcome(&self, entry: &CatalogEntry) -> FetchOutcome {
        match self.fetch_page(&entry.url).await {
            Ok(markup) => {
                let observation = self.extractor.extract(&markup);
                if observation.price.is_some() {
                    FetchOutcome::Priced(observation)
                } else {
                    FetchOutcome::NoPrice(observation)
                }
            }
            Err(e) => FetchOutcome::Failed(e),
        }
    }

    /// Scrape one entry into a [`Row`]. Never fails: fetch errors produce a
    /// row with no price fields.
    pub async fn fetch_one(&self, entry: &CatalogEntry) -> Row {
        let outcome = self.fetch_outcome(entry).await;

        match &outcome {
            FetchOutcome::Failed(e) => {
                tracing::debug!(url = %entry.url, outcome = outcome.kind(), error = %e, "product fetch");
            }
            _ => {
                tracing::debug!(url = %entry.url, outcome = outcome.kind(), "product fetch");
            }
        }

        Row::observed(entry.clone(), outcome.into_observation(), Utc::now())
    }
}

impl std::fmt::Debug for PageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFetcher").finish_non_exhaustive()
    }
}

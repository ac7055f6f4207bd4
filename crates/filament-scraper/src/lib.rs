pub mod error;
pub mod extract;
pub mod fetch;
pub mod snapshot;

pub use error::ScraperError;
pub use extract::{extract_price, MarkupExtractor, PriceExtractor};
pub use fetch::{FetchOutcome, PageFetcher};
pub use snapshot::scrape_all;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("response body from {url} could not be decoded: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

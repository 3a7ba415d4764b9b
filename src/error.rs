use thiserror::Error;

/// A page could not be retrieved even after every retry.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to fetch {url} after {attempts} attempt(s): {cause}")]
    Exhausted {
        url: String,
        attempts: u32,
        cause: String,
    },
}

/// No extraction stage produced a believable listing count.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("{site}: no plausible listing count found (expected a value in [{min}, {max}])")]
    NoPlausibleCount { site: String, min: u64, max: u64 },
}

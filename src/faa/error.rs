use thiserror::Error;

/// Failures of the FAA delay-feed stage. These degrade the cycle to
/// observations-without-delay-data; they never abort the cycle or the
/// schedule.
#[derive(Debug, Error)]
pub enum FaaError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body from {0}")]
    BodyRead(String, #[source] reqwest::Error),

    #[error("Malformed status feed markup")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed status feed: {0}")]
    MalformedFeed(String),
}

use thiserror::Error;

/// Failures of the METAR stage. Any of these abort the current cycle's
/// update (the previous render stays up); none of them stop the schedule.
#[derive(Debug, Error)]
pub enum MetarError {
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

    #[error("Failed to parse METAR response")]
    Parse(#[from] serde_json::Error),
}

use thiserror::Error;

/// Failures of the external IATA/ICAO code-translation lookup. All of these
/// are tolerated: the airport merely skips FAA merging for the cycle.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode code-translation reply for '{code}'")]
    Decode {
        code: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Code-translation lookup returned no counterpart for '{0}'")]
    NotFound(String),
}

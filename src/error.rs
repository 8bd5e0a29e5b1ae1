use crate::config::ConfigError;
use crate::faa::FaaError;
use crate::metar::MetarError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AviationWxError {
    #[error(transparent)]
    Metar(#[from] MetarError),

    #[error(transparent)]
    Faa(#[from] FaaError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build the HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("A fetch cycle is already in progress")]
    CycleInProgress,
}

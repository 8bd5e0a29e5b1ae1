mod aviationwx;
mod config;
mod error;
mod faa;
mod merge;
mod metar;
mod resolver;
mod types;

pub use aviationwx::{
    AviationWx, RenderSink, DEFAULT_FAA_URL, DEFAULT_LOOKUP_URL, DEFAULT_METAR_URL,
};
pub use error::AviationWxError;

pub use config::{AirportRequest, ConfigError, WidgetConfig, DEFAULT_AIRPORTS};
pub use merge::merge_cycle;
pub use resolver::{ResolveError, ResolvedAirport};

pub use faa::{DelayFeed, FaaError};
pub use metar::MetarError;

pub use types::{
    parse_duration_minutes, AirportResult, CycleUpdate, DelayCategory, DelayDetail, DelayRecord,
    DelaySeverity, FetchReport, FlightCategory, ObservationRecord,
};

mod delay;
mod observation;
mod result;

pub use delay::{parse_duration_minutes, DelayCategory, DelayDetail, DelayRecord, DelaySeverity};
pub use observation::{FlightCategory, ObservationRecord};
pub use result::{AirportResult, CycleUpdate, FetchReport};

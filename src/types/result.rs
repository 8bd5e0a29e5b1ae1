//! The merged per-airport unit exposed to the rendering consumer, the
//! "not reporting" report, and the per-cycle delivery envelope.

use crate::types::delay::{DelayCategory, DelayRecord, DelaySeverity};
use crate::types::observation::ObservationRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The merged status of one requested airport for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportResult {
    /// The code exactly as the user requested it.
    pub requested: String,
    /// ICAO form used for the METAR lookup.
    pub icao: String,
    /// IATA form used for the delay-feed lookup; `None` when identifier
    /// resolution failed (the airport then has no delay data).
    pub iata: Option<String>,
    /// The decoded observation; `None` means the airport produced no data
    /// this cycle.
    pub observation: Option<ObservationRecord>,
    /// At most one delay record per category.
    pub delays: BTreeMap<DelayCategory, DelayRecord>,
}

impl AirportResult {
    /// Worst severity across this airport's delay records;
    /// [`DelaySeverity::None`] when there are none.
    pub fn severity(&self) -> DelaySeverity {
        self.delays
            .values()
            .map(DelayRecord::severity)
            .max()
            .unwrap_or(DelaySeverity::None)
    }

    pub fn has_data(&self) -> bool {
        self.observation.is_some()
    }
}

/// Requested airports for which no observation could be located, in request
/// order. Drives the "not reporting" footnote; recomputed every cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchReport {
    pub not_reporting: Vec<String>,
}

impl FetchReport {
    pub fn is_empty(&self) -> bool {
        self.not_reporting.is_empty()
    }
}

impl fmt::Display for FetchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "No data for {} (may not be reporting)",
            self.not_reporting.join(" ")
        )
    }
}

/// Everything one completed fetch cycle hands to the rendering consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleUpdate {
    /// One entry per requested airport, in request order.
    pub airports: Vec<AirportResult>,
    pub report: FetchReport,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::delay::DelayDetail;

    #[test]
    fn severity_none_without_delays() {
        let result = AirportResult {
            requested: "KSFO".to_string(),
            icao: "KSFO".to_string(),
            iata: Some("SFO".to_string()),
            observation: None,
            delays: BTreeMap::new(),
        };
        assert_eq!(result.severity(), DelaySeverity::None);
    }

    #[test]
    fn severity_is_worst_across_categories() {
        let mut delays = BTreeMap::new();
        delays.insert(
            DelayCategory::GroundDelay,
            DelayRecord {
                category: DelayCategory::GroundDelay,
                airport: "SFO".to_string(),
                reason: "wind".to_string(),
                detail: DelayDetail::GroundDelay {
                    avg: Some("20 minutes".to_string()),
                    max: Some("40 minutes".to_string()),
                },
            },
        );
        delays.insert(
            DelayCategory::GroundStop,
            DelayRecord {
                category: DelayCategory::GroundStop,
                airport: "SFO".to_string(),
                reason: "thunderstorms".to_string(),
                detail: DelayDetail::GroundStop { end_time: None },
            },
        );
        let result = AirportResult {
            requested: "SFO".to_string(),
            icao: "KSFO".to_string(),
            iata: Some("SFO".to_string()),
            observation: None,
            delays,
        };
        assert_eq!(result.severity(), DelaySeverity::Major);
    }

    #[test]
    fn report_notice_lists_airports() {
        let report = FetchReport {
            not_reporting: vec!["JFK".to_string(), "PAO".to_string()],
        };
        assert_eq!(
            report.to_string(),
            "No data for JFK PAO (may not be reporting)"
        );
    }
}

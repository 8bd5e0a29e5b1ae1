//! Joins the METAR observation map and the FAA delay map into the final
//! per-airport results. Pure: same inputs, same outputs, no I/O.

use crate::resolver::ResolvedAirport;
use crate::types::{AirportResult, DelayRecord, FetchReport, ObservationRecord};
use std::collections::{BTreeMap, HashMap};

/// Builds one [`AirportResult`] per requested airport, in request order.
///
/// Observations are looked up by the ICAO form, delay lists by the IATA
/// form; an airport whose identifier resolution failed simply gets no
/// delays. At most one delay record per category is kept — the first
/// encountered in the feed. Requested airports missing from the observation
/// map are collected into the [`FetchReport`] under their requested code.
pub fn merge_cycle(
    resolved: &[ResolvedAirport],
    observations: &HashMap<String, ObservationRecord>,
    delays: &HashMap<String, Vec<DelayRecord>>,
) -> (Vec<AirportResult>, FetchReport) {
    let mut airports = Vec::with_capacity(resolved.len());
    let mut not_reporting = Vec::new();

    for airport in resolved {
        let observation = observations.get(&airport.icao).cloned();
        if observation.is_none() {
            not_reporting.push(airport.requested.clone());
        }

        let mut by_category = BTreeMap::new();
        if let Some(iata) = &airport.iata {
            for record in delays.get(iata).map(Vec::as_slice).unwrap_or_default() {
                by_category
                    .entry(record.category)
                    .or_insert_with(|| record.clone());
            }
        }

        airports.push(AirportResult {
            requested: airport.requested.clone(),
            icao: airport.icao.clone(),
            iata: airport.iata.clone(),
            observation,
            delays: by_category,
        });
    }

    (airports, FetchReport { not_reporting })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DelayCategory, DelayDetail, FlightCategory};
    use chrono::{TimeZone, Utc};

    fn resolved(requested: &str, icao: &str, iata: Option<&str>) -> ResolvedAirport {
        ResolvedAirport {
            requested: requested.to_string(),
            icao: icao.to_string(),
            iata: iata.map(str::to_string),
        }
    }

    fn observation(icao: &str) -> ObservationRecord {
        ObservationRecord {
            icao: icao.to_string(),
            site: String::new(),
            flight_category: FlightCategory::VFR,
            temperature_c: Some(14.0),
            dew_point_c: Some(9.0),
            wind_dir_deg: Some(280),
            wind_speed_kt: 12,
            visibility_sm: Some("10".to_string()),
            sky_cover: Some("CLR".to_string()),
            ceiling_ft: None,
            raw_report: String::new(),
            observed_at: Utc.with_ymd_and_hms(2024, 3, 12, 16, 56, 0).unwrap(),
            present_weather: String::new(),
        }
    }

    fn ground_delay(airport: &str, reason: &str) -> DelayRecord {
        DelayRecord {
            category: DelayCategory::GroundDelay,
            airport: airport.to_string(),
            reason: reason.to_string(),
            detail: DelayDetail::GroundDelay {
                avg: Some("25 minutes".to_string()),
                max: Some("1 hour and 26 minutes".to_string()),
            },
        }
    }

    #[test]
    fn missing_observation_goes_to_fetch_report() {
        let resolved = vec![
            resolved("KSFO", "KSFO", Some("SFO")),
            resolved("JFK", "KJFK", Some("JFK")),
        ];
        let mut observations = HashMap::new();
        observations.insert("KSFO".to_string(), observation("KSFO"));

        let (airports, report) = merge_cycle(&resolved, &observations, &HashMap::new());

        assert_eq!(report.not_reporting, ["JFK"]);
        assert!(airports[0].observation.is_some());
        assert!(airports[1].observation.is_none());
    }

    #[test]
    fn requested_order_is_preserved() {
        let resolved = vec![
            resolved("JFK", "KJFK", Some("JFK")),
            resolved("KSFO", "KSFO", Some("SFO")),
            resolved("PAO", "KPAO", Some("PAO")),
        ];
        let (airports, _) = merge_cycle(&resolved, &HashMap::new(), &HashMap::new());
        let order: Vec<&str> = airports.iter().map(|a| a.requested.as_str()).collect();
        assert_eq!(order, ["JFK", "KSFO", "PAO"]);
    }

    #[test]
    fn delay_attaches_by_iata_form() {
        let resolved = vec![resolved("KSFO", "KSFO", Some("SFO"))];
        let mut delays = HashMap::new();
        delays.insert("SFO".to_string(), vec![ground_delay("SFO", "runway construction")]);

        let (airports, _) = merge_cycle(&resolved, &HashMap::new(), &delays);

        let attached = &airports[0].delays[&DelayCategory::GroundDelay];
        assert_eq!(attached.reason, "runway construction");
        assert_eq!(
            attached.detail,
            DelayDetail::GroundDelay {
                avg: Some("25 minutes".to_string()),
                max: Some("1 hour and 26 minutes".to_string()),
            }
        );
        assert_eq!(airports[0].delays.len(), 1);
    }

    #[test]
    fn first_record_per_category_wins() {
        let resolved = vec![resolved("KSFO", "KSFO", Some("SFO"))];
        let mut delays = HashMap::new();
        delays.insert(
            "SFO".to_string(),
            vec![
                ground_delay("SFO", "first"),
                ground_delay("SFO", "second"),
            ],
        );

        let (airports, _) = merge_cycle(&resolved, &HashMap::new(), &delays);
        assert_eq!(airports[0].delays[&DelayCategory::GroundDelay].reason, "first");
    }

    #[test]
    fn unresolved_iata_skips_delay_merge_only() {
        let resolved = vec![resolved("EGLL", "EGLL", None)];
        let mut observations = HashMap::new();
        observations.insert("EGLL".to_string(), observation("EGLL"));
        let mut delays = HashMap::new();
        delays.insert("LHR".to_string(), vec![ground_delay("LHR", "wind")]);

        let (airports, report) = merge_cycle(&resolved, &observations, &delays);

        assert!(airports[0].observation.is_some());
        assert!(airports[0].delays.is_empty());
        assert!(report.is_empty());
    }

    #[test]
    fn empty_delay_map_equals_missing_keys() {
        let resolved = vec![resolved("KSFO", "KSFO", Some("SFO"))];
        let mut observations = HashMap::new();
        observations.insert("KSFO".to_string(), observation("KSFO"));

        // The degraded FAA path hands merge an empty map; the result must be
        // indistinguishable from a feed that just had no matching airports.
        let mut empty_list = HashMap::new();
        empty_list.insert("SFO".to_string(), Vec::new());

        let (from_empty_map, _) = merge_cycle(&resolved, &observations, &HashMap::new());
        let (from_empty_list, _) = merge_cycle(&resolved, &observations, &empty_list);
        assert_eq!(from_empty_map, from_empty_list);
    }

    #[test]
    fn merge_is_idempotent() {
        let resolved = vec![
            resolved("KSFO", "KSFO", Some("SFO")),
            resolved("JFK", "KJFK", Some("JFK")),
        ];
        let mut observations = HashMap::new();
        observations.insert("KSFO".to_string(), observation("KSFO"));
        let mut delays = HashMap::new();
        delays.insert("SFO".to_string(), vec![ground_delay("SFO", "wind")]);

        let first = merge_cycle(&resolved, &observations, &delays);
        let second = merge_cycle(&resolved, &observations, &delays);
        assert_eq!(first, second);
    }
}

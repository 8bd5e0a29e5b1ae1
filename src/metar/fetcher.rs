//! Batched METAR fetch and per-airport indexing.
//!
//! One request covers the whole configured airport set; the response is a
//! heterogeneous list of observation objects that gets scanned per requested
//! ICAO id. Airports without a matching entry are simply absent from the
//! output map and surface later through the fetch report.

use crate::metar::error::MetarError;
use crate::types::{FlightCategory, ObservationRecord};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

pub(crate) struct MetarFetcher {
    client: Client,
    base_url: String,
    debug: bool,
}

impl MetarFetcher {
    pub(crate) fn new(client: Client, base_url: String, debug: bool) -> Self {
        Self {
            client,
            base_url,
            debug,
        }
    }

    /// Issues the single batched request for `icao_ids` and indexes the
    /// decoded observations by ICAO id.
    pub(crate) async fn fetch(
        &self,
        icao_ids: &[&str],
    ) -> Result<HashMap<String, ObservationRecord>, MetarError> {
        let url = format!(
            "{}?format=json&hours=1&ids={}",
            self.base_url,
            icao_ids.join(",")
        );
        info!("fetching METAR data for {} airports", icao_ids.len());
        debug!("METAR request url: {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MetarError::NetworkRequest(url.clone(), e))?;
        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("METAR request failed for {url}: {e}");
                return Err(if let Some(status) = e.status() {
                    MetarError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    MetarError::NetworkRequest(url, e)
                });
            }
        };

        let body = response
            .text()
            .await
            .map_err(|e| MetarError::BodyRead(url, e))?;
        if self.debug {
            debug!("METAR response body: {body}");
        }
        index_observations(&body, icao_ids)
    }
}

/// Decodes the METAR response body and scans it once per requested code.
/// The first matching entry that forms a complete record wins; undecodable
/// entries are skipped rather than failing the stage.
pub(crate) fn index_observations(
    body: &str,
    requested: &[&str],
) -> Result<HashMap<String, ObservationRecord>, MetarError> {
    let rows: Vec<Value> = serde_json::from_str(body)?;
    let decoded: Vec<RawMetar> = rows
        .into_iter()
        .filter_map(|row| match RawMetar::deserialize(&row) {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!("skipping undecodable METAR entry: {e}");
                None
            }
        })
        .collect();

    let mut observations = HashMap::new();
    for &code in requested {
        if observations.contains_key(code) {
            continue;
        }
        for raw in &decoded {
            if raw.icao_id.as_deref() != Some(code) {
                continue;
            }
            match raw.to_record() {
                Some(record) => {
                    observations.insert(code.to_string(), record);
                    break;
                }
                None => warn!("METAR entry for {code} lacks required fields, skipping it"),
            }
        }
    }
    Ok(observations)
}

/// Mirror of one upstream observation object. Everything is optional here;
/// [`RawMetar::to_record`] decides what a usable record requires.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetar {
    #[serde(default)]
    icao_id: Option<String>,
    #[serde(default, alias = "site")]
    name: Option<String>,
    #[serde(default, alias = "fltcat")]
    flt_cat: Option<String>,
    #[serde(default)]
    temp: Option<f64>,
    #[serde(default)]
    dewp: Option<f64>,
    #[serde(default, deserialize_with = "de_wind_direction")]
    wdir: Option<u16>,
    #[serde(default)]
    wspd: Option<u32>,
    #[serde(default, deserialize_with = "de_visibility")]
    visib: Option<String>,
    #[serde(default)]
    cover: Option<String>,
    #[serde(default)]
    ceil: Option<u32>,
    #[serde(default)]
    raw_ob: Option<String>,
    #[serde(default, deserialize_with = "de_observation_time")]
    obs_time: Option<DateTime<Utc>>,
    #[serde(default, alias = "wx")]
    wx_string: Option<String>,
}

impl RawMetar {
    fn to_record(&self) -> Option<ObservationRecord> {
        let icao = self.icao_id.clone()?;
        let flight_category: FlightCategory = self.flt_cat.as_deref()?.parse().ok()?;
        let observed_at = self.obs_time?;
        Some(ObservationRecord {
            icao,
            site: self.name.clone().unwrap_or_default(),
            flight_category,
            temperature_c: self.temp,
            dew_point_c: self.dewp,
            wind_dir_deg: self.wdir,
            wind_speed_kt: self.wspd.unwrap_or(0),
            visibility_sm: self.visib.clone(),
            sky_cover: self.cover.clone(),
            ceiling_ft: self.ceil,
            raw_report: self.raw_ob.clone().unwrap_or_default(),
            observed_at,
            present_weather: self.wx_string.clone().unwrap_or_default(),
        })
    }
}

/// Wind direction arrives as a number of degrees or as `"VRB"` for variable
/// winds; both map onto `Option<u16>` with variable as `None`.
fn de_wind_direction<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }
    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Number(n)) if (0..=360).contains(&n) => Some(n as u16),
        Some(Raw::Number(_)) => None,
        Some(Raw::Text(s)) => s.trim().parse::<u16>().ok(),
    })
}

/// Visibility mixes plain numbers and strings like `"10+"`.
fn de_visibility<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }
    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Number(n)) if n.fract() == 0.0 => Some(format!("{}", n as i64)),
        Some(Raw::Number(n)) => Some(n.to_string()),
        Some(Raw::Text(s)) => Some(s.trim().to_string()),
    })
}

/// Observation timestamps arrive as ISO-8601 text or as Unix epoch seconds;
/// either way they are reinterpreted as UTC.
fn de_observation_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Epoch(i64),
        Text(String),
    }
    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Epoch(secs)) => DateTime::from_timestamp(secs, 0),
        Some(Raw::Text(s)) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|t| t.with_timezone(&Utc)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const KSFO_ONLY: &str = r#"[
        {
            "icaoId": "KSFO",
            "name": "San Francisco Intl",
            "fltCat": "VFR",
            "temp": 14.0,
            "dewp": 9.0,
            "wdir": 5,
            "wspd": 7,
            "visib": 10.0,
            "cover": "FEW",
            "rawOb": "KSFO 121656Z 00507KT 10SM FEW020 14/09 A3012",
            "obsTime": "2024-03-12T16:56:00Z"
        }
    ]"#;

    #[test]
    fn requested_airport_without_entry_is_absent() {
        let observations = index_observations(KSFO_ONLY, &["KSFO", "KJFK"]).unwrap();
        assert_eq!(observations.len(), 1);
        let ksfo = &observations["KSFO"];
        assert_eq!(ksfo.site, "San Francisco Intl");
        assert_eq!(ksfo.flight_category, FlightCategory::VFR);
        assert_eq!(ksfo.wind_display(), "005@07kt");
        assert!(!observations.contains_key("KJFK"));
    }

    #[test]
    fn observation_time_parses_as_utc() {
        let observations = index_observations(KSFO_ONLY, &["KSFO"]).unwrap();
        assert_eq!(
            observations["KSFO"].observed_at,
            Utc.with_ymd_and_hms(2024, 3, 12, 16, 56, 0).unwrap()
        );
    }

    #[test]
    fn epoch_observation_time_accepted() {
        let body = r#"[{"icaoId":"KPAO","fltCat":"MVFR","obsTime":1710262560}]"#;
        let observations = index_observations(body, &["KPAO"]).unwrap();
        assert_eq!(
            observations["KPAO"].observed_at,
            DateTime::from_timestamp(1710262560, 0).unwrap()
        );
    }

    #[test]
    fn variable_wind_and_string_visibility() {
        let body = r#"[{
            "icaoId": "KHAF",
            "fltCat": "IFR",
            "wdir": "VRB",
            "wspd": 4,
            "visib": "10+",
            "obsTime": "2024-03-12T16:00:00Z"
        }]"#;
        let observations = index_observations(body, &["KHAF"]).unwrap();
        let rec = &observations["KHAF"];
        assert_eq!(rec.wind_dir_deg, None);
        assert_eq!(rec.wind_display(), "VRB@04kt");
        assert_eq!(rec.visibility_sm.as_deref(), Some("10+"));
    }

    #[test]
    fn entry_without_flight_category_is_skipped() {
        let body = r#"[
            {"icaoId": "KSQL", "obsTime": "2024-03-12T16:00:00Z"},
            {"icaoId": "KSQL", "fltCat": "VFR", "obsTime": "2024-03-12T15:00:00Z"}
        ]"#;
        let observations = index_observations(body, &["KSQL"]).unwrap();
        // The incomplete first entry is passed over in favor of the next
        // complete one for the same field.
        assert_eq!(
            observations["KSQL"].flight_category,
            FlightCategory::VFR
        );
    }

    #[test]
    fn first_complete_match_wins() {
        let body = r#"[
            {"icaoId": "KSFO", "fltCat": "IFR", "obsTime": "2024-03-12T16:56:00Z"},
            {"icaoId": "KSFO", "fltCat": "VFR", "obsTime": "2024-03-12T15:56:00Z"}
        ]"#;
        let observations = index_observations(body, &["KSFO"]).unwrap();
        assert_eq!(observations["KSFO"].flight_category, FlightCategory::IFR);
    }

    #[test]
    fn malformed_body_is_a_parse_error() {
        assert!(matches!(
            index_observations("not json", &["KSFO"]),
            Err(MetarError::Parse(_))
        ));
    }

    #[test]
    fn unreported_wind_speed_is_calm() {
        let body = r#"[{"icaoId":"KSFO","fltCat":"VFR","obsTime":"2024-03-12T16:56:00Z"}]"#;
        let observations = index_observations(body, &["KSFO"]).unwrap();
        assert_eq!(observations["KSFO"].wind_display(), "CALM");
    }
}

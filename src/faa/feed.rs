//! Normalizes the converted status document into per-airport delay records.
//!
//! Every list in the document — the `Delay_type` sections themselves and
//! each section's entry list — is coerced through an is-array check before
//! iteration, because the markup-to-object conversion collapses a
//! one-element list into a bare object. Four section types carry per-airport
//! data; the airspace-flow section does not and is skipped.

use crate::faa::error::FaaError;
use crate::faa::xml::markup_to_value;
use crate::types::{DelayCategory, DelayDetail, DelayRecord};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Section list element, entry element, and the category they map to.
const SECTIONS: [(&str, &str, DelayCategory); 4] = [
    ("Ground_Delay_List", "Ground_Delay", DelayCategory::GroundDelay),
    (
        "Arrival_Departure_Delay_List",
        "Delay",
        DelayCategory::ArrivalDeparture,
    ),
    ("Airport_Closure_List", "Airport", DelayCategory::Closure),
    ("Ground_Stop_List", "Program", DelayCategory::GroundStop),
];

/// Informational section without per-airport data.
const AIRSPACE_FLOW_LIST: &str = "Airspace_Flow_List";

/// The normalized delay feed: every airport mentioned in any section, keyed
/// by the IATA code the feed reports (`ARPT`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DelayFeed {
    /// The feed's own update timestamp, verbatim.
    pub update_time: Option<String>,
    pub delays: HashMap<String, Vec<DelayRecord>>,
}

impl DelayFeed {
    /// Converts and normalizes a raw status-feed document. Pure: feed text
    /// in, per-airport records out.
    pub fn from_markup(xml: &str) -> Result<Self, FaaError> {
        let doc = markup_to_value(xml)?;
        normalize_feed(&doc)
    }

    /// Delay records for one airport. A missing key and an empty list are
    /// the same thing: no delays.
    pub fn delays_for(&self, iata: &str) -> &[DelayRecord] {
        self.delays.get(iata).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Wraps a bare object into a one-element list; lists pass through.
pub(crate) fn coerce_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

pub(crate) fn normalize_feed(doc: &Value) -> Result<DelayFeed, FaaError> {
    let status = doc.get("AIRPORT_STATUS_INFORMATION").ok_or_else(|| {
        FaaError::MalformedFeed("missing AIRPORT_STATUS_INFORMATION root".to_string())
    })?;
    let update_time = status
        .get("Update_Time")
        .and_then(Value::as_str)
        .map(str::to_owned);

    let mut delays: HashMap<String, Vec<DelayRecord>> = HashMap::new();
    if let Some(types) = status.get("Delay_type") {
        for section in coerce_list(types) {
            normalize_section(section, &mut delays);
        }
    }
    Ok(DelayFeed {
        update_time,
        delays,
    })
}

fn normalize_section(section: &Value, delays: &mut HashMap<String, Vec<DelayRecord>>) {
    if section.get(AIRSPACE_FLOW_LIST).is_some() {
        debug!("skipping airspace flow programs section");
        return;
    }
    let mut recognized = false;
    for (list_key, entry_key, category) in SECTIONS {
        let Some(list) = section.get(list_key) else {
            continue;
        };
        recognized = true;
        let Some(entries) = list.get(entry_key) else {
            continue; // present but empty section
        };
        for entry in coerce_list(entries) {
            if let Some(record) = decode_entry(category, entry) {
                delays.entry(record.airport.clone()).or_default().push(record);
            }
        }
    }
    if !recognized {
        let name = section.get("Name").and_then(Value::as_str).unwrap_or("?");
        debug!("skipping unrecognized delay section '{name}'");
    }
}

fn decode_entry(category: DelayCategory, entry: &Value) -> Option<DelayRecord> {
    match category {
        DelayCategory::GroundDelay => {
            let e: GroundDelayEntry = decode(entry, category)?;
            build(
                category,
                e.arpt,
                e.reason,
                DelayDetail::GroundDelay {
                    avg: e.avg,
                    max: e.max,
                },
            )
        }
        DelayCategory::ArrivalDeparture => {
            let e: ArrivalDepartureEntry = decode(entry, category)?;
            // The Arrival_Departure element can itself occur once or twice
            // (arrival and departure legs); keep the first, as everywhere.
            let detail = e
                .arrival_departure
                .as_ref()
                .and_then(|v| coerce_list(v).into_iter().next())
                .and_then(|v| decode::<ArrivalDepartureDetail>(v, category))
                .unwrap_or_default();
            build(
                category,
                e.arpt,
                e.reason,
                DelayDetail::ArrivalDeparture {
                    kind: detail.kind,
                    min: detail.min,
                    max: detail.max,
                    trend: detail.trend,
                },
            )
        }
        DelayCategory::Closure => {
            let e: ClosureEntry = decode(entry, category)?;
            build(
                category,
                e.arpt,
                e.reason,
                DelayDetail::Closure {
                    start: e.start,
                    reopen: e.reopen,
                },
            )
        }
        DelayCategory::GroundStop => {
            let e: GroundStopEntry = decode(entry, category)?;
            build(
                category,
                e.arpt,
                e.reason,
                DelayDetail::GroundStop {
                    end_time: e.end_time,
                },
            )
        }
    }
}

fn decode<T: DeserializeOwned>(entry: &Value, category: DelayCategory) -> Option<T> {
    match serde_json::from_value(entry.clone()) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!("skipping undecodable {category} entry: {e}");
            None
        }
    }
}

fn build(
    category: DelayCategory,
    arpt: Option<String>,
    reason: Option<String>,
    detail: DelayDetail,
) -> Option<DelayRecord> {
    let airport = match arpt {
        Some(code) if !code.trim().is_empty() => code.trim().to_ascii_uppercase(),
        _ => {
            warn!("skipping {category} entry without an ARPT code");
            return None;
        }
    };
    Some(DelayRecord {
        category,
        airport,
        reason: reason.unwrap_or_default(),
        detail,
    })
}

#[derive(Debug, Deserialize)]
struct GroundDelayEntry {
    #[serde(rename = "ARPT", default)]
    arpt: Option<String>,
    #[serde(rename = "Reason", default)]
    reason: Option<String>,
    #[serde(rename = "Avg", default)]
    avg: Option<String>,
    #[serde(rename = "Max", default)]
    max: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArrivalDepartureEntry {
    #[serde(rename = "ARPT", default)]
    arpt: Option<String>,
    #[serde(rename = "Reason", default)]
    reason: Option<String>,
    #[serde(rename = "Arrival_Departure", default)]
    arrival_departure: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ArrivalDepartureDetail {
    #[serde(rename = "Type", default)]
    kind: Option<String>,
    #[serde(rename = "Min", default)]
    min: Option<String>,
    #[serde(rename = "Max", default)]
    max: Option<String>,
    #[serde(rename = "Trend", default)]
    trend: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClosureEntry {
    #[serde(rename = "ARPT", default)]
    arpt: Option<String>,
    #[serde(rename = "Reason", default)]
    reason: Option<String>,
    #[serde(rename = "Start", default)]
    start: Option<String>,
    #[serde(rename = "Reopen", default)]
    reopen: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GroundStopEntry {
    #[serde(rename = "ARPT", default)]
    arpt: Option<String>,
    #[serde(rename = "Reason", default)]
    reason: Option<String>,
    #[serde(rename = "End_Time", default)]
    end_time: Option<String>,
}

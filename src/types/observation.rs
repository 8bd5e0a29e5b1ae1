//! Defines the decoded METAR observation record and the flight-category
//! classification derived from ceiling and visibility.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ceiling/visibility-derived flight-rules classification reported with
/// each METAR observation.
///
/// The upstream feed reports these as the literal strings `"VFR"`, `"MVFR"`,
/// `"IFR"` and `"LIFR"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightCategory {
    /// Visual flight rules.
    VFR,
    /// Marginal visual flight rules.
    MVFR,
    /// Instrument flight rules.
    IFR,
    /// Low instrument flight rules.
    LIFR,
}

impl fmt::Display for FlightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlightCategory::VFR => "VFR",
            FlightCategory::MVFR => "MVFR",
            FlightCategory::IFR => "IFR",
            FlightCategory::LIFR => "LIFR",
        };
        f.write_str(s)
    }
}

impl FromStr for FlightCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VFR" => Ok(FlightCategory::VFR),
            "MVFR" => Ok(FlightCategory::MVFR),
            "IFR" => Ok(FlightCategory::IFR),
            "LIFR" => Ok(FlightCategory::LIFR),
            _ => Err(()),
        }
    }
}

/// One decoded weather observation for a single airport.
///
/// Built fresh each fetch cycle from the batched METAR response and immutable
/// once built; the next cycle replaces it wholesale. Fields that the
/// heterogeneous upstream list does not always carry are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    /// ICAO identifier the observation was reported under.
    pub icao: String,
    /// Site name of the reporting field, empty when the feed omits it.
    pub site: String,
    /// Flight-rules classification for the observation.
    pub flight_category: FlightCategory,
    /// Temperature in degrees Celsius.
    pub temperature_c: Option<f64>,
    /// Dew point in degrees Celsius.
    pub dew_point_c: Option<f64>,
    /// Wind direction in degrees; `None` means variable (or unreported).
    pub wind_dir_deg: Option<u16>,
    /// Wind speed in knots. Unreported speed is treated as calm.
    pub wind_speed_kt: u32,
    /// Visibility in statute miles, as reported (the feed mixes numbers and
    /// strings such as `"10+"`).
    pub visibility_sm: Option<String>,
    /// Sky cover code (`CLR`, `FEW`, `BKN`, `OVC`, ...).
    pub sky_cover: Option<String>,
    /// Ceiling height in feet, when a ceiling exists.
    pub ceiling_ft: Option<u32>,
    /// The raw METAR text.
    pub raw_report: String,
    /// Observation timestamp, UTC.
    pub observed_at: DateTime<Utc>,
    /// Free-text present weather (`-RA BR`, ...), empty when none reported.
    pub present_weather: String,
}

impl ObservationRecord {
    /// Wind for display: `CALM` at zero speed, otherwise zero-padded
    /// direction and speed as `ddd@sskt` (`VRB` when direction is variable).
    pub fn wind_display(&self) -> String {
        if self.wind_speed_kt == 0 {
            return "CALM".to_string();
        }
        match self.wind_dir_deg {
            Some(dir) => format!("{dir:03}@{:02}kt", self.wind_speed_kt),
            None => format!("VRB@{:02}kt", self.wind_speed_kt),
        }
    }

    /// Ceiling for display: the sky-cover code alone when no ceiling height
    /// is present, otherwise `<cover> <height>`.
    pub fn ceiling_display(&self) -> String {
        match (self.sky_cover.as_deref(), self.ceiling_ft) {
            (Some(cover), Some(ceiling)) => format!("{cover} {ceiling}"),
            (Some(cover), None) => cover.to_string(),
            (None, Some(ceiling)) => ceiling.to_string(),
            (None, None) => String::new(),
        }
    }

    /// The observation timestamp converted to the viewer's local zone.
    pub fn observed_local(&self) -> DateTime<Local> {
        self.observed_at.with_timezone(&Local)
    }

    /// Whole minutes elapsed between the observation and `now`.
    pub fn minutes_since(&self, now: DateTime<Utc>) -> i64 {
        (now - self.observed_at).num_minutes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> ObservationRecord {
        ObservationRecord {
            icao: "KSFO".to_string(),
            site: "San Francisco Intl".to_string(),
            flight_category: FlightCategory::VFR,
            temperature_c: Some(14.0),
            dew_point_c: Some(9.0),
            wind_dir_deg: Some(5),
            wind_speed_kt: 7,
            visibility_sm: Some("10".to_string()),
            sky_cover: Some("FEW".to_string()),
            ceiling_ft: None,
            raw_report: "KSFO 121656Z 00507KT 10SM FEW020 14/09 A3012".to_string(),
            observed_at: Utc.with_ymd_and_hms(2024, 3, 12, 16, 56, 0).unwrap(),
            present_weather: String::new(),
        }
    }

    #[test]
    fn wind_display_pads_direction_and_speed() {
        assert_eq!(record().wind_display(), "005@07kt");
    }

    #[test]
    fn wind_display_calm_at_zero_speed() {
        let mut rec = record();
        rec.wind_speed_kt = 0;
        assert_eq!(rec.wind_display(), "CALM");
    }

    #[test]
    fn wind_display_variable_direction() {
        let mut rec = record();
        rec.wind_dir_deg = None;
        assert_eq!(rec.wind_display(), "VRB@07kt");
    }

    #[test]
    fn ceiling_display_cover_only_without_height() {
        assert_eq!(record().ceiling_display(), "FEW");
    }

    #[test]
    fn ceiling_display_with_height() {
        let mut rec = record();
        rec.sky_cover = Some("BKN".to_string());
        rec.ceiling_ft = Some(1500);
        assert_eq!(rec.ceiling_display(), "BKN 1500");
    }

    #[test]
    fn minutes_since_observation() {
        let rec = record();
        let now = Utc.with_ymd_and_hms(2024, 3, 12, 17, 26, 30).unwrap();
        assert_eq!(rec.minutes_since(now), 30);
    }

    #[test]
    fn flight_category_from_str() {
        assert_eq!("mvfr".parse::<FlightCategory>(), Ok(FlightCategory::MVFR));
        assert!("XFR".parse::<FlightCategory>().is_err());
    }
}

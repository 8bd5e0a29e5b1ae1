//! Widget configuration as delivered by the host dashboard: the airport
//! list, per-airport domestic flags, update interval and debug switch.

use bon::bon;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Airports shown when the host supplies none.
pub const DEFAULT_AIRPORTS: &str = "KSFO,PAO,HAF,JFK";

const DEFAULT_UPDATE_INTERVAL_MINUTES: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No airports configured")]
    EmptyAirports,

    #[error("Invalid airport code '{0}' (expected 3 or 4 alphanumeric characters)")]
    InvalidAirportCode(String),

    #[error("Invalid US_country flag '{0}' (expected Y or N)")]
    InvalidCountryFlag(String),

    #[error("Invalid updateInterval '{0}' (expected whole minutes, at least 1)")]
    InvalidUpdateInterval(String),

    #[error("Invalid debug flag '{0}' (expected true or false)")]
    InvalidDebugFlag(String),
}

/// One requested airport: the code as configured (uppercased) and whether it
/// is a domestic (U.S.) field, which decides how identifier translation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportRequest {
    pub code: String,
    pub domestic: bool,
}

/// Parsed widget configuration.
///
/// Build one from the host's option strings with
/// [`WidgetConfig::from_options`], or programmatically through the builder:
///
/// ```
/// use aviationwx::WidgetConfig;
///
/// let config = WidgetConfig::builder()
///     .airports("KSFO, LHR")
///     .us_country("Y,N")
///     .update_interval_minutes(5)
///     .build()
///     .unwrap();
/// assert_eq!(config.airports.len(), 2);
/// assert!(!config.airports[1].domestic);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub airports: Vec<AirportRequest>,
    pub update_interval: Duration,
    pub debug: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        let airports = DEFAULT_AIRPORTS
            .split(',')
            .map(|code| AirportRequest {
                code: code.to_string(),
                domestic: true,
            })
            .collect();
        Self {
            airports,
            update_interval: Duration::from_secs(DEFAULT_UPDATE_INTERVAL_MINUTES * 60),
            debug: false,
        }
    }
}

#[bon]
impl WidgetConfig {
    /// Builds a configuration from the raw option strings.
    ///
    /// * `airports` — comma-separated 3- or 4-letter codes (required).
    /// * `us_country` — parallel comma-separated `Y`/`N` flags; omitted or
    ///   short lists default the remaining airports to domestic.
    /// * `update_interval_minutes` — cycle interval, default 10.
    /// * `debug` — enables payload dumps in the log, default off.
    #[builder]
    pub fn new(
        airports: &str,
        us_country: Option<&str>,
        update_interval_minutes: Option<u64>,
        debug: Option<bool>,
    ) -> Result<Self, ConfigError> {
        let codes = parse_airport_codes(airports)?;
        let flags = match us_country {
            Some(raw) => parse_country_flags(raw)?,
            None => Vec::new(),
        };
        if flags.len() > codes.len() {
            warn!(
                "US_country lists {} flags for {} airports, ignoring the extras",
                flags.len(),
                codes.len()
            );
        }
        let airports = codes
            .into_iter()
            .enumerate()
            .map(|(i, code)| AirportRequest {
                code,
                domestic: flags.get(i).copied().unwrap_or(true),
            })
            .collect();

        let minutes = update_interval_minutes.unwrap_or(DEFAULT_UPDATE_INTERVAL_MINUTES);
        if minutes == 0 {
            return Err(ConfigError::InvalidUpdateInterval(minutes.to_string()));
        }

        Ok(Self {
            airports,
            update_interval: Duration::from_secs(minutes * 60),
            debug: debug.unwrap_or(false),
        })
    }

    /// Parses the host's option map. Recognized keys: `airports`,
    /// `US_country`, `updateInterval`, `debug`; anything else is ignored so
    /// presentation-only options can pass through untouched.
    pub fn from_options(options: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let airports = options
            .get("airports")
            .map(String::as_str)
            .unwrap_or(DEFAULT_AIRPORTS);
        let us_country = options.get("US_country").map(String::as_str);

        let update_interval_minutes = options
            .get("updateInterval")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidUpdateInterval(raw.clone()))
            })
            .transpose()?;

        let debug = options
            .get("debug")
            .map(|raw| match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(ConfigError::InvalidDebugFlag(raw.clone())),
            })
            .transpose()?;

        Self::builder()
            .airports(airports)
            .maybe_us_country(us_country)
            .maybe_update_interval_minutes(update_interval_minutes)
            .maybe_debug(debug)
            .build()
    }
}

fn parse_airport_codes(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut codes = Vec::new();
    for entry in raw.split(',') {
        let code = entry.trim();
        if code.is_empty() {
            continue;
        }
        if !(3..=4).contains(&code.len()) || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::InvalidAirportCode(code.to_string()));
        }
        codes.push(code.to_ascii_uppercase());
    }
    if codes.is_empty() {
        return Err(ConfigError::EmptyAirports);
    }
    Ok(codes)
}

fn parse_country_flags(raw: &str) -> Result<Vec<bool>, ConfigError> {
    raw.split(',')
        .map(|entry| match entry.trim().to_ascii_uppercase().as_str() {
            "Y" | "" => Ok(true),
            "N" => Ok(false),
            other => Err(ConfigError::InvalidCountryFlag(other.to_string())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_all_domestic() {
        let config = WidgetConfig::default();
        assert_eq!(config.airports.len(), 4);
        assert!(config.airports.iter().all(|a| a.domestic));
        assert_eq!(config.update_interval, Duration::from_secs(600));
        assert!(!config.debug);
    }

    #[test]
    fn codes_are_trimmed_and_uppercased() {
        let config = WidgetConfig::builder()
            .airports(" ksfo , jfk ")
            .build()
            .unwrap();
        let codes: Vec<&str> = config.airports.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, ["KSFO", "JFK"]);
    }

    #[test]
    fn short_flag_list_pads_domestic() {
        let config = WidgetConfig::builder()
            .airports("KSFO,LHR,JFK")
            .us_country("Y,N")
            .build()
            .unwrap();
        let flags: Vec<bool> = config.airports.iter().map(|a| a.domestic).collect();
        assert_eq!(flags, [true, false, true]);
    }

    #[test]
    fn rejects_bad_code() {
        let err = WidgetConfig::builder().airports("KSFO,TOOLONG").build();
        assert!(matches!(err, Err(ConfigError::InvalidAirportCode(c)) if c == "TOOLONG"));
    }

    #[test]
    fn rejects_empty_airport_list() {
        let err = WidgetConfig::builder().airports(" , ").build();
        assert!(matches!(err, Err(ConfigError::EmptyAirports)));
    }

    #[test]
    fn rejects_zero_interval() {
        let err = WidgetConfig::builder()
            .airports("KSFO")
            .update_interval_minutes(0)
            .build();
        assert!(matches!(err, Err(ConfigError::InvalidUpdateInterval(_))));
    }

    #[test]
    fn from_options_parses_host_strings() {
        let mut options = HashMap::new();
        options.insert("airports".to_string(), "KSFO,PAO".to_string());
        options.insert("US_country".to_string(), "Y,Y".to_string());
        options.insert("updateInterval".to_string(), "5".to_string());
        options.insert("debug".to_string(), "true".to_string());
        options.insert("fadeSpeed".to_string(), "1000".to_string()); // ignored

        let config = WidgetConfig::from_options(&options).unwrap();
        assert_eq!(config.airports.len(), 2);
        assert_eq!(config.update_interval, Duration::from_secs(300));
        assert!(config.debug);
    }

    #[test]
    fn from_options_rejects_bad_interval() {
        let mut options = HashMap::new();
        options.insert("updateInterval".to_string(), "soon".to_string());
        assert!(matches!(
            WidgetConfig::from_options(&options),
            Err(ConfigError::InvalidUpdateInterval(_))
        ));
    }
}

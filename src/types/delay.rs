//! Delay assertions extracted from the FAA airport status feed, and the
//! severity classification used for display emphasis.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four actionable delay-type sections of the FAA status feed.
///
/// A fifth section (airspace flow programs) exists upstream but carries no
/// per-airport data and is never represented here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DelayCategory {
    GroundDelay,
    ArrivalDeparture,
    Closure,
    GroundStop,
}

impl DelayCategory {
    pub fn label(&self) -> &'static str {
        match self {
            DelayCategory::GroundDelay => "Ground Delay",
            DelayCategory::ArrivalDeparture => "Arrival/Departure Delay",
            DelayCategory::Closure => "Airport Closure",
            DelayCategory::GroundStop => "Ground Stop",
        }
    }
}

impl fmt::Display for DelayCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One delay assertion for one airport in one category.
///
/// At most one record per (airport, category) survives merging; when the feed
/// yields several, the first encountered wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRecord {
    pub category: DelayCategory,
    /// IATA code the feed reported the delay under (`ARPT`).
    pub airport: String,
    /// Reason text, empty when the feed omits it.
    pub reason: String,
    pub detail: DelayDetail,
}

/// Category-specific timing and trend fields.
///
/// Durations stay as the feed's free text (`"1 hour and 26 minutes"`);
/// [`parse_duration_minutes`] recovers the structured value when one is
/// needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelayDetail {
    GroundDelay {
        avg: Option<String>,
        max: Option<String>,
    },
    ArrivalDeparture {
        /// `Arrival` or `Departure`, from the feed's `Type` attribute.
        kind: Option<String>,
        min: Option<String>,
        max: Option<String>,
        trend: Option<String>,
    },
    Closure {
        start: Option<String>,
        reopen: Option<String>,
    },
    GroundStop {
        end_time: Option<String>,
    },
}

/// Display-emphasis classification of an airport's delay state.
///
/// Ordered so that the worst classification compares greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DelaySeverity {
    /// No delay data, or explicit confirmation of no delay.
    None,
    /// A bounded delay shorter than an hour.
    Minor,
    /// A delay of an hour or more, a closure, or a ground stop.
    Major,
}

impl DelayRecord {
    /// The duration text that characterizes this delay, preferring the upper
    /// bound: max, then avg (ground delays) or min (arrival/departure).
    pub fn effective_delay(&self) -> Option<&str> {
        match &self.detail {
            DelayDetail::GroundDelay { avg, max } => max.as_deref().or(avg.as_deref()),
            DelayDetail::ArrivalDeparture { min, max, .. } => max.as_deref().or(min.as_deref()),
            DelayDetail::Closure { .. } | DelayDetail::GroundStop { .. } => None,
        }
    }

    /// Severity classification. Bounded delays classify by their parsed
    /// duration (an hour or more is major); closures and ground stops carry
    /// no bounded duration and are always major.
    pub fn severity(&self) -> DelaySeverity {
        match &self.detail {
            DelayDetail::Closure { .. } | DelayDetail::GroundStop { .. } => DelaySeverity::Major,
            DelayDetail::GroundDelay { .. } | DelayDetail::ArrivalDeparture { .. } => {
                match self.effective_delay().and_then(parse_duration_minutes) {
                    Some(minutes) if minutes >= 60 => DelaySeverity::Major,
                    _ => DelaySeverity::Minor,
                }
            }
        }
    }
}

/// Parses a free-text delay duration (`"1 hour and 26 minutes"`,
/// `"25 minutes"`) into whole minutes. Returns `None` when no
/// number-with-unit pair is found.
pub fn parse_duration_minutes(text: &str) -> Option<u32> {
    let mut total: u32 = 0;
    let mut matched = false;
    let mut pending: Option<u32> = None;
    for token in text.split_whitespace() {
        if let Ok(n) = token.parse::<u32>() {
            pending = Some(n);
            continue;
        }
        let unit: String = token
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_ascii_lowercase();
        if let Some(n) = pending.take() {
            if unit.starts_with("hour") || unit == "hr" || unit == "hrs" {
                total = total.saturating_add(n.saturating_mul(60));
                matched = true;
            } else if unit.starts_with("min") {
                total = total.saturating_add(n);
                matched = true;
            }
        }
    }
    matched.then_some(total)
}

//! The main entry point: owns the HTTP client and the per-stage fetchers,
//! runs guarded fetch cycles, and drives the recurring update schedule.

use crate::config::WidgetConfig;
use crate::error::AviationWxError;
use crate::faa::{DelayFeed, FaaError, FaaFetcher};
use crate::merge::merge_cycle;
use crate::metar::{MetarError, MetarFetcher};
use crate::resolver::{CodeResolver, ResolvedAirport};
use crate::types::{CycleUpdate, ObservationRecord};
use bon::bon;
use chrono::Utc;
use log::{debug, info, warn};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::MissedTickBehavior;

/// Batched METAR endpoint; the airport id list is appended per request.
pub const DEFAULT_METAR_URL: &str = "https://aviationweather.gov/api/data/metar";
/// FAA national airport status feed (XML).
pub const DEFAULT_FAA_URL: &str = "https://nasstatus.faa.gov/api/airport-status-information";
/// IATA/ICAO code-translation endpoint, queried once per unresolved code.
pub const DEFAULT_LOOKUP_URL: &str = "https://www.airport-data.com/api/ap_info.json";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// The rendering consumer. Receives the finished per-airport results once
/// per completed cycle; how they become a table is its business.
pub trait RenderSink {
    fn deliver(&mut self, update: CycleUpdate);
}

/// The dashboard widget core.
///
/// Construct one with the builder, then either call [`fetch_cycle`] on the
/// host's trigger or hand a [`RenderSink`] to [`run`] for the recurring
/// schedule.
///
/// [`fetch_cycle`]: AviationWx::fetch_cycle
/// [`run`]: AviationWx::run
///
/// # Examples
///
/// ```no_run
/// use aviationwx::{AviationWx, WidgetConfig};
///
/// # async fn example() -> Result<(), aviationwx::AviationWxError> {
/// let config = WidgetConfig::builder()
///     .airports("KSFO,PAO,HAF,JFK")
///     .build()?;
/// let widget = AviationWx::builder().config(config).build()?;
///
/// let update = widget.fetch_cycle().await?;
/// for airport in &update.airports {
///     println!("{} -> {:?}", airport.requested, airport.severity());
/// }
/// # Ok(())
/// # }
/// ```
pub struct AviationWx {
    config: WidgetConfig,
    resolver: CodeResolver,
    metar: MetarFetcher,
    faa: FaaFetcher,
    cycle_guard: Mutex<()>,
}

#[bon]
impl AviationWx {
    /// Builds the widget core.
    ///
    /// * `.config(WidgetConfig)` — **required**.
    /// * `.metar_url(..)` / `.faa_url(..)` / `.lookup_url(..)` — endpoint
    ///   overrides, mainly for tests against local fixtures.
    /// * `.timeout(Duration)` — per-request bound so one stuck call fails
    ///   alone instead of wedging the cycle. Defaults to 15 seconds.
    #[builder]
    pub fn new(
        config: WidgetConfig,
        metar_url: Option<String>,
        faa_url: Option<String>,
        lookup_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, AviationWxError> {
        let client = Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(AviationWxError::ClientBuild)?;
        let resolver = CodeResolver::new(
            client.clone(),
            lookup_url.unwrap_or_else(|| DEFAULT_LOOKUP_URL.to_string()),
        );
        let metar = MetarFetcher::new(
            client.clone(),
            metar_url.unwrap_or_else(|| DEFAULT_METAR_URL.to_string()),
            config.debug,
        );
        let faa = FaaFetcher::new(
            client,
            faa_url.unwrap_or_else(|| DEFAULT_FAA_URL.to_string()),
            config.debug,
        );
        Ok(Self {
            config,
            resolver,
            metar,
            faa,
            cycle_guard: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Runs one fetch cycle: resolve identifiers, fetch METAR and the delay
    /// feed concurrently, merge.
    ///
    /// Returns [`AviationWxError::CycleInProgress`] if a previous cycle's
    /// network operations are still outstanding. A METAR failure abandons
    /// the cycle's update (the consumer keeps its previous render); a
    /// delay-feed failure only strips the delay annotation.
    pub async fn fetch_cycle(&self) -> Result<CycleUpdate, AviationWxError> {
        let _cycle = self
            .cycle_guard
            .try_lock()
            .map_err(|_| AviationWxError::CycleInProgress)?;

        info!(
            "starting fetch cycle for {} airports",
            self.config.airports.len()
        );
        let resolved = self.resolver.resolve_all(&self.config.airports).await;
        let icao_ids: Vec<&str> = resolved.iter().map(|a| a.icao.as_str()).collect();

        let (observations, delay_feed) =
            tokio::join!(self.metar.fetch(&icao_ids), self.faa.fetch());
        assemble_update(&resolved, observations, delay_feed)
    }

    /// Drives the recurring schedule: one cycle per configured interval
    /// (first one immediately), each completed update delivered to `sink`.
    ///
    /// No error halts the schedule — failed cycles are logged and the
    /// previous render stays. Returns when `shutdown` signals (or its
    /// sender is dropped); an in-flight cycle is abandoned by cancellation
    /// without blocking the return.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use aviationwx::{AviationWx, CycleUpdate, RenderSink, WidgetConfig};
    /// use tokio::sync::watch;
    ///
    /// struct Printer;
    ///
    /// impl RenderSink for Printer {
    ///     fn deliver(&mut self, update: CycleUpdate) {
    ///         println!("{} airports updated", update.airports.len());
    ///     }
    /// }
    ///
    /// # async fn example() -> Result<(), aviationwx::AviationWxError> {
    /// let config = WidgetConfig::builder().airports("KSFO,JFK").build()?;
    /// let widget = AviationWx::builder().config(config).build()?;
    /// let (stop, stop_rx) = watch::channel(false);
    /// widget.run(&mut Printer, stop_rx).await;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run<S: RenderSink>(&self, sink: &mut S, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.config.update_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = interval.tick() => {}
            }
            tokio::select! {
                _ = shutdown.changed() => break,
                result = self.fetch_cycle() => match result {
                    Ok(update) => sink.deliver(update),
                    Err(AviationWxError::CycleInProgress) => {
                        debug!("previous cycle still running, skipping this tick");
                    }
                    Err(e) => warn!("fetch cycle failed, keeping the previous render: {e}"),
                },
            }
        }
        info!("shutdown requested, stopping the update schedule");
    }
}

/// Combines the stage outcomes into the cycle's update. Split from the
/// client so the failure semantics stay a pure function of the responses.
fn assemble_update(
    resolved: &[ResolvedAirport],
    observations: Result<HashMap<String, ObservationRecord>, MetarError>,
    delay_feed: Result<DelayFeed, FaaError>,
) -> Result<CycleUpdate, AviationWxError> {
    let observations = observations?;
    let delays = match delay_feed {
        Ok(feed) => feed.delays,
        Err(e) => {
            warn!("delay feed unavailable, rendering observations only: {e}");
            HashMap::new()
        }
    };

    let (airports, report) = merge_cycle(resolved, &observations, &delays);
    if !report.is_empty() {
        info!("{report}");
    }
    Ok(CycleUpdate {
        airports,
        report,
        completed_at: Utc::now(),
    })
}

//! Maps each requested airport code to the identifier form every upstream
//! source needs: ICAO for the METAR lookup, IATA for the delay feed.
//!
//! Domestic (U.S.) codes translate with the `K`-prefix convention; anything
//! else goes through the external code-translation endpoint, one request per
//! unresolved code. Translation failures are tolerated: the airport still
//! hits METAR with the best code available and only skips FAA merging.

use crate::config::AirportRequest;
use crate::resolver::error::ResolveError;
use futures_util::future::join_all;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// The identifier forms resolved for one requested airport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAirport {
    /// The code exactly as requested.
    pub requested: String,
    /// Best-effort ICAO form, used as the METAR lookup key.
    pub icao: String,
    /// IATA form, used as the delay-feed lookup key; `None` when
    /// translation failed.
    pub iata: Option<String>,
}

pub(crate) struct CodeResolver {
    client: Client,
    lookup_url: String,
}

#[derive(Debug, Deserialize)]
struct LookupReply {
    #[serde(default)]
    icao: Option<String>,
    #[serde(default)]
    iata: Option<String>,
}

impl CodeResolver {
    pub(crate) fn new(client: Client, lookup_url: String) -> Self {
        Self { client, lookup_url }
    }

    /// Resolves every requested airport. External lookups for unresolved
    /// codes run concurrently, and all of them settle before this returns,
    /// so the merge stage never races a late lookup.
    pub(crate) async fn resolve_all(&self, airports: &[AirportRequest]) -> Vec<ResolvedAirport> {
        join_all(airports.iter().map(|req| self.resolve(req))).await
    }

    async fn resolve(&self, req: &AirportRequest) -> ResolvedAirport {
        let code = req.code.as_str();
        if code.len() == 4 {
            let iata = if req.domestic && code.starts_with('K') {
                code.strip_prefix('K').map(str::to_string)
            } else {
                // Domestic codes outside the K convention (PANC, PHNL) fall
                // through to the external lookup like non-domestic ones.
                match self.lookup_iata(code).await {
                    Ok(iata) => Some(iata),
                    Err(e) => {
                        warn!("IATA lookup for {code} failed, skipping FAA merge for it: {e}");
                        None
                    }
                }
            };
            ResolvedAirport {
                requested: req.code.clone(),
                icao: req.code.clone(),
                iata,
            }
        } else if req.domestic {
            ResolvedAirport {
                requested: req.code.clone(),
                icao: format!("K{code}"),
                iata: Some(req.code.clone()),
            }
        } else {
            let icao = match self.lookup_icao(code).await {
                Ok(icao) => icao,
                Err(e) => {
                    warn!("ICAO lookup for {code} failed, trying METAR with the code as-is: {e}");
                    req.code.clone()
                }
            };
            ResolvedAirport {
                requested: req.code.clone(),
                icao,
                iata: Some(req.code.clone()),
            }
        }
    }

    async fn lookup_iata(&self, icao: &str) -> Result<String, ResolveError> {
        let reply = self.fetch_reply("icao", icao).await?;
        reply
            .iata
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().to_ascii_uppercase())
            .ok_or_else(|| ResolveError::NotFound(icao.to_string()))
    }

    async fn lookup_icao(&self, iata: &str) -> Result<String, ResolveError> {
        let reply = self.fetch_reply("iata", iata).await?;
        reply
            .icao
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().to_ascii_uppercase())
            .ok_or_else(|| ResolveError::NotFound(iata.to_string()))
    }

    async fn fetch_reply(&self, key: &str, code: &str) -> Result<LookupReply, ResolveError> {
        let url = format!("{}?{}={}", self.lookup_url, key, code);
        debug!("translating airport code via {url}");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ResolveError::NetworkRequest(url.clone(), e))?;
        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                return Err(if let Some(status) = e.status() {
                    ResolveError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    ResolveError::NetworkRequest(url, e)
                });
            }
        };
        response
            .json::<LookupReply>()
            .await
            .map_err(|e| ResolveError::Decode {
                code: code.to_string(),
                source: e,
            })
    }
}

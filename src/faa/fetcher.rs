use crate::faa::error::FaaError;
use crate::faa::feed::DelayFeed;
use log::{debug, info, warn};
use reqwest::Client;

pub(crate) struct FaaFetcher {
    client: Client,
    url: String,
    debug: bool,
}

impl FaaFetcher {
    pub(crate) fn new(client: Client, url: String, debug: bool) -> Self {
        Self { client, url, debug }
    }

    /// Downloads the status feed and normalizes it. The response is gzip
    /// compressed upstream; the client decompresses transparently.
    pub(crate) async fn fetch(&self) -> Result<DelayFeed, FaaError> {
        info!("fetching FAA airport status feed");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FaaError::NetworkRequest(self.url.clone(), e))?;
        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("FAA status request failed for {}: {e}", self.url);
                return Err(if let Some(status) = e.status() {
                    FaaError::HttpStatus {
                        url: self.url.clone(),
                        status,
                        source: e,
                    }
                } else {
                    FaaError::NetworkRequest(self.url.clone(), e)
                });
            }
        };

        let body = response
            .text()
            .await
            .map_err(|e| FaaError::BodyRead(self.url.clone(), e))?;
        if self.debug {
            debug!("FAA response body: {body}");
        }
        DelayFeed::from_markup(&body)
    }
}

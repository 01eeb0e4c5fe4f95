//! Resilient JSON fetching
//!
//! The core contract of the crate: GET a URL, get back validated JSON or
//! a terminal error. A direct attempt comes first; when it fails for any
//! reason the request is retried through each relay in the chain, in
//! order, stopping at the first route that produces a payload the
//! validator accepts. Timeouts, transport errors, and bad shapes are all
//! the same thing here: "this route did not work, try the next."

use log::{debug, warn};
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::api::proxy::ProxyChain;
use crate::api::validate::is_valid_payload;
use crate::models::{AttemptOutcome, FetchAttempt, Route};

/// Per-attempt timeout. Applies to each route individually, not to the
/// whole call.
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(8);

/// Fetch error taxonomy. Only `Unreachable` ever escapes
/// [`ResilientFetcher::fetch_json`]; the other variants describe single
/// attempts and surface as its `last` field.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {0}")]
    Status(u16),

    #[error("Body was not JSON: {0}")]
    InvalidBody(String),

    #[error("Response shape not recognized")]
    InvalidShape,

    #[error("All routes exhausted after {attempts} attempts: {last}")]
    Unreachable {
        attempts: usize,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(err)
        }
    }
}

/// Direct-then-relay fetcher. Holds no memory of which route worked;
/// every call restarts from the top of the chain.
pub struct ResilientFetcher {
    client: reqwest::Client,
    chain: ProxyChain,
}

impl ResilientFetcher {
    /// Fetcher with the default public relay chain
    pub fn new() -> Self {
        Self::with_chain(ProxyChain::default())
    }

    /// Fetcher with an explicit chain (tests aim this at a mock server)
    pub fn with_chain(chain: ProxyChain) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(ATTEMPT_TIMEOUT)
                .build()
                .unwrap_or_default(),
            chain,
        }
    }

    pub fn chain(&self) -> &ProxyChain {
        &self.chain
    }

    /// Fetch `target_url` and return its validated JSON payload.
    ///
    /// Tries the direct route, then each relay in chain order, returning
    /// on the first success. Fails only when every route is exhausted.
    pub async fn fetch_json(&self, target_url: &str) -> Result<Value, FetchError> {
        let mut attempts: Vec<FetchAttempt> = Vec::with_capacity(1 + self.chain.len());

        match self.attempt(Route::Direct, target_url, &mut attempts).await {
            Ok(payload) => {
                debug!("direct fetch succeeded for {}", target_url);
                return Ok(payload);
            }
            Err(err) => {
                debug!("direct fetch failed for {}: {}", target_url, err);
                let mut last = err;

                for (index, relay) in self.chain.iter().enumerate() {
                    let relay_url = relay.relay_url(target_url);
                    match self
                        .attempt(Route::Proxy(index), &relay_url, &mut attempts)
                        .await
                    {
                        Ok(payload) => {
                            debug!("relay {} succeeded for {}", relay, target_url);
                            return Ok(payload);
                        }
                        Err(err) => {
                            debug!("relay {} failed for {}: {}", relay, target_url, err);
                            last = err;
                        }
                    }
                }

                for attempt in &attempts {
                    debug!("attempt: {}", attempt);
                }
                warn!(
                    "all routes exhausted for {} ({} attempts)",
                    target_url,
                    attempts.len()
                );
                Err(FetchError::Unreachable {
                    attempts: attempts.len(),
                    last: Box::new(last),
                })
            }
        }
    }

    /// One route: GET, read as text, parse, validate. Records the attempt.
    async fn attempt(
        &self,
        route: Route,
        url: &str,
        attempts: &mut Vec<FetchAttempt>,
    ) -> Result<Value, FetchError> {
        let started = Instant::now();
        let result = self.request(url).await;

        let outcome = match &result {
            Ok(_) => AttemptOutcome::Success,
            Err(FetchError::InvalidShape) => AttemptOutcome::InvalidShape,
            Err(err) => AttemptOutcome::Rejected(err.to_string()),
        };
        attempts.push(FetchAttempt {
            route,
            outcome,
            latency: started.elapsed(),
        });

        result
    }

    async fn request(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(FetchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // Read as text first: relays sometimes wrap or pad the body, and
        // a streaming JSON decode would lose the diagnostic.
        let text = response
            .text()
            .await
            .map_err(FetchError::from_transport)?;

        let payload: Value = serde_json::from_str(text.trim())
            .map_err(|e| FetchError::InvalidBody(e.to_string()))?;

        if !is_valid_payload(&payload) {
            return Err(FetchError::InvalidShape);
        }

        Ok(payload)
    }
}

impl Default for ResilientFetcher {
    fn default() -> Self {
        Self::new()
    }
}

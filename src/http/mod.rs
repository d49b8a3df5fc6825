//! Authenticated REST channel
//!
//! Wraps the vendor REST API: Basic-auth signing, multi-key rotation
//! against an externally-owned call counter, and 429 retry with capped
//! exponential backoff plus jitter. Everything else (4xx/5xx) propagates
//! immediately.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::alert::WebhookAlerter;
use crate::config::Cin7Config;
use crate::error::{ApiError, Cin7Error, ConfigError, Result};
use crate::rotation::KeyRotationCounter;
use crate::utils::logging::truncate_text;

const BASE_URL: &str = "https://api.cin7.com/api/v1";
/// Retries never exceed this, whatever the request asks for
const HARD_RETRY_CEILING: u32 = 10;
const DEFAULT_RETRY_LIMIT: u32 = 5;
const LOG_BODY_LIMIT: usize = 500;

/// One logical outbound call
#[derive(Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Per-request 429 retry ceiling; clamped to the hard ceiling
    pub retry_limit: Option<u32>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
            retry_limit: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
            retry_limit: None,
        }
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::PUT,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
            retry_limit: None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

struct Rotation {
    counter: Arc<dyn KeyRotationCounter>,
    cutoff: u64,
}

/// The REST channel shared by all sub-clients
pub struct ApiChannel {
    http: reqwest::Client,
    base_url: String,
    username: String,
    keys: Vec<String>,
    rotation: Option<Rotation>,
    alerter: Option<Arc<WebhookAlerter>>,
}

impl ApiChannel {
    pub fn new(
        config: &Cin7Config,
        counter: Option<Arc<dyn KeyRotationCounter>>,
        alerter: Option<Arc<WebhookAlerter>>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let rotation = match (&config.options.key_rotation, counter) {
            (Some(options), _) if !options.enabled => None,
            (Some(options), Some(counter)) => Some(Rotation {
                counter,
                cutoff: options.cutoff,
            }),
            (Some(_), None) => {
                return Err(Cin7Error::Config(ConfigError::RotationCounterMissing))
            }
            (None, _) => None,
        };

        Ok(Self {
            http,
            base_url: BASE_URL.to_string(),
            username: config.auth.api.username.clone(),
            keys: config.api_keys().iter().map(|k| k.to_string()).collect(),
            rotation,
            alerter,
        })
    }

    /// Point the channel at a different endpoint (mock servers in tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn get(&self, path: impl Into<String>) -> Result<Value> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn post(&self, path: impl Into<String>, body: Value) -> Result<Value> {
        self.send(ApiRequest::post(path, body)).await
    }

    pub async fn put(&self, path: impl Into<String>, body: Value) -> Result<Value> {
        self.send(ApiRequest::put(path, body)).await
    }

    /// Execute one logical call, including key selection and 429 retries
    pub async fn send(&self, request: ApiRequest) -> Result<Value> {
        // key selection happens once; retries reuse the same headers
        let key_index = self.select_key_index().await?;
        let password = &self.keys[key_index.unwrap_or(0)];
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .basic_auth(&self.username, Some(password));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let prepared = builder.build()?;

        let ceiling = request
            .retry_limit
            .unwrap_or(DEFAULT_RETRY_LIMIT)
            .min(HARD_RETRY_CEILING);
        let mut attempts: u32 = 0;

        loop {
            let outbound = prepared
                .try_clone()
                .ok_or_else(|| Cin7Error::Other("request body is not cloneable".into()))?;
            debug!(
                "→ {} {} {}",
                request.method,
                url,
                request
                    .body
                    .as_ref()
                    .map(|b| truncate_text(&b.to_string(), LOG_BODY_LIMIT))
                    .unwrap_or_default()
            );

            let response = match self.http.execute(outbound).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("⚠️ {} {} failed: {}", request.method, url, e);
                    self.alert_error(&format!("Cin7 request to {} failed: {}", request.path, e))
                        .await;
                    return Err(e.into());
                }
            };

            // counts must reflect actual calls made, not business success,
            // so record before looking at the status
            self.record_call(key_index).await;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempts >= ceiling {
                    warn!(
                        "⚠️ {} still rate limited after {} attempts, giving up",
                        request.path, attempts
                    );
                    self.alert_error(&format!(
                        "Cin7 rate limit on {} not clearing after {} attempts",
                        request.path, attempts
                    ))
                    .await;
                    return Err(Cin7Error::Api(ApiError::RateLimited {
                        path: request.path,
                        attempts,
                    }));
                }
                attempts += 1;
                let delay = backoff_delay(attempts);
                info!(
                    "retrying {} in {}ms (attempt {}/{})",
                    request.path,
                    delay.as_millis(),
                    attempts,
                    ceiling
                );
                sleep(delay).await;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                warn!(
                    "⚠️ {} {} → {}: {}",
                    request.method,
                    url,
                    status,
                    truncate_text(&body, LOG_BODY_LIMIT)
                );
                self.alert_error(&format!(
                    "Cin7 returned {} for {}: {}",
                    status,
                    request.path,
                    truncate_text(&body, LOG_BODY_LIMIT)
                ))
                .await;
                return Err(Cin7Error::bad_status(request.path, status.as_u16(), body));
            }

            let body = response.text().await?;
            debug!("← {} {} {}", status, url, truncate_text(&body, LOG_BODY_LIMIT));
            if body.trim().is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_str(&body)?);
        }
    }

    async fn select_key_index(&self) -> Result<Option<usize>> {
        let rotation = match &self.rotation {
            Some(rotation) => rotation,
            None => return Ok(None),
        };
        let counts = rotation.counter.get().await?;
        match pick_key_index(&counts, self.keys.len(), rotation.cutoff) {
            Some(index) => {
                debug!("signing with API key {}", index);
                Ok(Some(index))
            }
            None => Err(Cin7Error::Api(ApiError::QuotaExhausted)),
        }
    }

    async fn record_call(&self, key_index: Option<usize>) {
        if let (Some(rotation), Some(index)) = (&self.rotation, key_index) {
            // counter state is external and eventually consistent; a
            // failed increment must not fail the business call
            if let Err(e) = rotation.counter.increment(&index.to_string()).await {
                warn!("⚠️ failed to increment call counter for key {}: {}", index, e);
            }
        }
    }

    async fn alert_error(&self, message: &str) {
        if let Some(alerter) = &self.alerter {
            alerter.alert(message).await;
        }
    }
}

/// First key whose call count is under the cutoff; missing entries count
/// as zero
fn pick_key_index(counts: &HashMap<String, u64>, key_count: usize, cutoff: u64) -> Option<usize> {
    (0..key_count).find(|index| counts.get(&index.to_string()).copied().unwrap_or(0) < cutoff)
}

/// `min(1000 · 2^attempts, 8000)` ms plus up to ±500ms of jitter
fn backoff_delay(attempts: u32) -> Duration {
    let base = 1000u64
        .saturating_mul(2u64.saturating_pow(attempts))
        .min(8000);
    let jitter = rand::thread_rng().gen_range(-500i64..=500);
    Duration::from_millis(base.saturating_add_signed(jitter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_first_key_under_the_cutoff() {
        let counts = HashMap::from([("0".to_string(), 4901), ("1".to_string(), 10)]);
        assert_eq!(pick_key_index(&counts, 2, 4900), Some(1));
    }

    #[test]
    fn missing_count_entries_read_as_zero() {
        let counts = HashMap::from([("0".to_string(), 4900)]);
        assert_eq!(pick_key_index(&counts, 2, 4900), Some(1));
    }

    #[test]
    fn exhausted_keys_select_nothing() {
        let counts = HashMap::from([("0".to_string(), 5000), ("1".to_string(), 4900)]);
        assert_eq!(pick_key_index(&counts, 2, 4900), None);
    }

    #[test]
    fn backoff_base_doubles_then_caps() {
        // jitter keeps the delay within ±500ms of the base
        for (attempt, base) in [(1u32, 2000u64), (2, 4000), (3, 8000), (4, 8000), (9, 8000)] {
            let delay = backoff_delay(attempt).as_millis() as u64;
            assert!(
                delay >= base - 500 && delay <= base + 500,
                "attempt {}: {}ms outside [{}, {}]",
                attempt,
                delay,
                base - 500,
                base + 500
            );
        }
    }
}

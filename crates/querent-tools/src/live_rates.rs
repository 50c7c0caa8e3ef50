//! Live exchange rates from a pair-rate HTTP API
//!
//! Request shape: `{endpoint}/{api_key}/pair/{FROM}/{TO}`; a successful body
//! carries `"result": "success"` and `"conversion_rate"`.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use querent_config::LiveRatesConfig;

#[derive(Debug, Error, PartialEq)]
pub enum LiveRateError {
    #[error("request failed: {0}")]
    Http(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("api rejected request: {0}")]
    Rejected(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Deserialize)]
struct PairResponse {
    result: String,
    #[serde(default)]
    conversion_rate: Option<f64>,
    #[serde(default, rename = "error-type")]
    error_type: Option<String>,
}

/// Extract the conversion rate from a pair response body.
pub fn parse_pair_response(body: &str) -> Result<f64, LiveRateError> {
    let response: PairResponse = serde_json::from_str(body)
        .map_err(|e| LiveRateError::InvalidResponse(e.to_string()))?;
    if response.result != "success" {
        return Err(LiveRateError::Rejected(
            response.error_type.unwrap_or(response.result),
        ));
    }
    match response.conversion_rate {
        Some(rate) if rate.is_finite() && rate > 0.0 => Ok(rate),
        Some(rate) => Err(LiveRateError::InvalidResponse(format!(
            "conversion rate {} is not positive",
            rate
        ))),
        None => Err(LiveRateError::InvalidResponse(
            "missing conversion_rate".to_string(),
        )),
    }
}

pub struct LiveRateSource {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl LiveRateSource {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LiveRateError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LiveRateError::Http(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// `None` when disabled, when no API key is available, or when the
    /// HTTP client cannot be built.
    pub fn from_config(config: &LiveRatesConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let api_key = config.resolve_api_key()?;
        match Self::new(
            config.endpoint.as_str(),
            api_key,
            Duration::from_secs(config.timeout_secs),
        ) {
            Ok(source) => Some(source),
            Err(err) => {
                warn!(error = %err, "live exchange rates disabled");
                None
            }
        }
    }

    /// Rate to multiply an amount in `from` by to get `to`.
    pub async fn pair_rate(&self, from: &str, to: &str) -> Result<f64, LiveRateError> {
        let url = format!("{}/{}/pair/{}/{}", self.endpoint, self.api_key, from, to);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LiveRateError::Http(e.without_url().to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(LiveRateError::Status(status.as_u16()));
        }
        let body = response
            .text()
            .await
            .map_err(|e| LiveRateError::Http(e.without_url().to_string()))?;
        let rate = parse_pair_response(&body)?;
        debug!(from, to, rate, "live exchange rate");
        Ok(rate)
    }
}

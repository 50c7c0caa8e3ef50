//! Currency conversion
//!
//! A live pair rate is used when a [`LiveRateSource`] is configured; any
//! failure there falls back to the USD-relative static table.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use querent_config::CurrencyConfig;
use querent_core::tool::{names, Tool, ToolError, ToolInput};
use querent_core::ToolValue;

use crate::live_rates::LiveRateSource;

#[derive(Debug, Error, PartialEq)]
pub enum CurrencyError {
    #[error("amount cannot be negative")]
    NegativeAmount,
    #[error("amount must be a finite number")]
    InvalidAmount,
    #[error("currency code '{0}' must be 3 letters (e.g., USD, EUR)")]
    InvalidCode(String),
    #[error("unsupported currency: {code}. Supported currencies: {supported}")]
    Unsupported { code: String, supported: String },
}

impl From<CurrencyError> for ToolError {
    fn from(err: CurrencyError) -> Self {
        ToolError::Failed(err.to_string())
    }
}

pub struct CurrencyTool {
    rates: BTreeMap<String, f64>,
    live: Option<LiveRateSource>,
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn normalize_code(code: &str) -> Result<String, CurrencyError> {
    let code = code.trim().to_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CurrencyError::InvalidCode(code));
    }
    Ok(code)
}

fn validate(amount: f64, from: &str, to: &str) -> Result<(String, String), CurrencyError> {
    if !amount.is_finite() {
        return Err(CurrencyError::InvalidAmount);
    }
    if amount < 0.0 {
        return Err(CurrencyError::NegativeAmount);
    }
    Ok((normalize_code(from)?, normalize_code(to)?))
}

impl CurrencyTool {
    /// Static rates from config; the live source is attached when an API key is available.
    pub fn new(config: &CurrencyConfig) -> Self {
        Self {
            live: LiveRateSource::from_config(&config.live),
            ..Self::static_rates(config)
        }
    }

    /// Static rates only, whatever the live settings say.
    pub fn static_rates(config: &CurrencyConfig) -> Self {
        Self {
            rates: config
                .rates
                .iter()
                .map(|(code, rate)| (code.trim().to_uppercase(), *rate))
                .collect(),
            live: None,
        }
    }

    pub fn with_live_source(mut self, source: LiveRateSource) -> Self {
        self.live = Some(source);
        self
    }

    pub fn has_live_source(&self) -> bool {
        self.live.is_some()
    }

    fn rate(&self, code: &str) -> Result<f64, CurrencyError> {
        self.rates
            .get(code)
            .copied()
            .ok_or_else(|| CurrencyError::Unsupported {
                code: code.to_string(),
                supported: self.rates.keys().cloned().collect::<Vec<_>>().join(", "),
            })
    }

    fn table_rate(&self, from: &str, to: &str) -> Result<f64, CurrencyError> {
        Ok((1.0 / self.rate(from)?) * self.rate(to)?)
    }

    /// Convert `amount` with the static table, rounded to cents.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, CurrencyError> {
        let (from, to) = validate(amount, from, to)?;
        if from == to {
            return Ok(round_cents(amount));
        }
        Ok(round_cents(amount * self.table_rate(&from, &to)?))
    }

    /// Convert `amount`, preferring the live rate, rounded to cents.
    ///
    /// Codes only need to be in the static table when the live rate is unavailable.
    pub async fn exchange(&self, amount: f64, from: &str, to: &str) -> Result<f64, CurrencyError> {
        let (from, to) = validate(amount, from, to)?;
        if from == to {
            return Ok(round_cents(amount));
        }
        if let Some(live) = &self.live {
            match live.pair_rate(&from, &to).await {
                Ok(rate) => return Ok(round_cents(amount * rate)),
                Err(err) => warn!(
                    error = %err,
                    from = %from,
                    to = %to,
                    "live exchange rate unavailable, using static rates"
                ),
            }
        }
        Ok(round_cents(amount * self.table_rate(&from, &to)?))
    }
}

impl Default for CurrencyTool {
    fn default() -> Self {
        Self::static_rates(&CurrencyConfig::default())
    }
}

#[async_trait]
impl Tool for CurrencyTool {
    fn name(&self) -> &str {
        names::CURRENCY
    }

    fn description(&self) -> &str {
        "Convert an amount between currencies"
    }

    fn operations(&self) -> &[&'static str] {
        &["currency_convert"]
    }

    async fn call(&self, _operation: &str, input: ToolInput) -> Result<ToolValue, ToolError> {
        let amount = input.number("amount")?;
        let from = input.text("from_currency")?;
        let to = input.text("to_currency")?;
        let converted = self.exchange(amount, &from, &to).await?;
        tracing::debug!(amount, from = %from, to = %to, converted, "currency converted");
        Ok(ToolValue::Number(converted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use querent_core::{ParamValue, Parameters};

    #[test]
    fn test_conversions() {
        let tool = CurrencyTool::default();
        assert_eq!(tool.convert(100.0, "USD", "EUR"), Ok(85.0));
        assert_eq!(tool.convert(50.0, "EUR", "USD"), Ok(58.82));
        assert_eq!(tool.convert(200.0, "usd", "gbp"), Ok(146.0));
        assert_eq!(tool.convert(75.0, "GBP", "EUR"), Ok(87.33));
        assert_eq!(tool.convert(15.0, "USD", "EUR"), Ok(12.75));
    }

    #[test]
    fn test_same_currency_rounds() {
        let tool = CurrencyTool::default();
        assert_eq!(tool.convert(10.456, "EUR", "eur"), Ok(10.46));
    }

    #[test]
    fn test_validation() {
        let tool = CurrencyTool::default();
        assert_eq!(
            tool.convert(-1.0, "USD", "EUR"),
            Err(CurrencyError::NegativeAmount)
        );
        assert!(matches!(
            tool.convert(1.0, "US", "EUR"),
            Err(CurrencyError::InvalidCode(_))
        ));
        assert!(matches!(
            tool.convert(1.0, "U5D", "EUR"),
            Err(CurrencyError::InvalidCode(_))
        ));
        assert!(matches!(
            tool.convert(1.0, "USD", "XYZ"),
            Err(CurrencyError::Unsupported { ref code, .. }) if code == "XYZ"
        ));
    }

    fn unreachable_source() -> LiveRateSource {
        LiveRateSource::new(
            "http://127.0.0.1:9/v6",
            "test-key",
            std::time::Duration::from_secs(1),
        )
        .expect("client")
    }

    #[test]
    fn test_no_live_source_without_key() {
        let mut config = CurrencyConfig::default();
        config.live.api_key_env = "QUERENT_TEST_RATES_KEY_NEVER_SET".to_string();
        assert!(!CurrencyTool::new(&config).has_live_source());

        config.live.api_key = Some("test-key".to_string());
        assert!(CurrencyTool::new(&config).has_live_source());
    }

    #[tokio::test]
    async fn test_unreachable_live_source_falls_back_to_table() {
        let tool = CurrencyTool::default().with_live_source(unreachable_source());
        assert_eq!(tool.exchange(100.0, "USD", "EUR").await, Ok(85.0));
        assert_eq!(tool.exchange(75.0, "gbp", "eur").await, Ok(87.33));
        assert!(matches!(
            tool.exchange(1.0, "USD", "XYZ").await,
            Err(CurrencyError::Unsupported { .. })
        ));
        // validation and same-currency never reach the network
        assert_eq!(
            tool.exchange(-5.0, "USD", "EUR").await,
            Err(CurrencyError::NegativeAmount)
        );
        assert_eq!(tool.exchange(10.456, "EUR", "EUR").await, Ok(10.46));
    }

    #[tokio::test]
    async fn test_call_returns_number() {
        let params: Parameters = [
            ("amount", ParamValue::Number(100.0)),
            ("from_currency", ParamValue::from("USD")),
            ("to_currency", ParamValue::from("EUR")),
        ]
        .into_iter()
        .collect();
        let value = CurrencyTool::default()
            .call("currency_convert", ToolInput::new(params))
            .await
            .expect("convert");
        assert_eq!(value, ToolValue::Number(85.0));
    }
}

//! exchangerate.host style provider.
//!
//! Queries `GET {base_url}/latest?base={HOME}&symbols=USD,EUR` and expects:
//!
//! ```json
//! { "success": true, "base": "RUB", "rates": { "USD": 0.011111, "EUR": 0.01 } }
//! ```
//!
//! The API quotes how many units of each symbol one unit of the base buys.
//! Snapshots hold the opposite direction (price of the symbol in the base),
//! so every value is inverted and rounded to six places.

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::HomeRateSnapshot;
use crate::provider::{
    build_http_client, number_to_decimal, read_body, round_price, ExchangeRateProvider,
};

/// Provider ID constant
const PROVIDER_ID: &str = "EXCHANGERATE_HOST";

/// Public endpoint used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.exchangerate.host";

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    rates: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

pub struct ExchangeRateHostProvider {
    client: Client,
    base_url: String,
}

impl ExchangeRateHostProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, MarketDataError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn parse_error(message: impl Into<String>) -> MarketDataError {
        MarketDataError::Parse {
            provider: PROVIDER_ID.to_string(),
            message: message.into(),
        }
    }

    /// Turns a `/latest` body into a snapshot of home-currency prices.
    pub(crate) fn parse_latest(
        body: &str,
        home: &str,
        symbols: &[String],
    ) -> Result<HomeRateSnapshot, MarketDataError> {
        let response: LatestResponse =
            serde_json::from_str(body).map_err(|e| Self::parse_error(e.to_string()))?;

        if response.success == Some(false) {
            let message = response
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "API request failed".to_string());
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message,
            });
        }

        if let Some(base) = response.base.as_deref() {
            if !base.eq_ignore_ascii_case(home) {
                return Err(Self::parse_error(format!(
                    "response quoted against {} instead of {}",
                    base, home
                )));
            }
        }

        let rates = response
            .rates
            .ok_or_else(|| Self::parse_error("missing 'rates' object"))?;

        let mut snapshot = HomeRateSnapshot::new(home, PROVIDER_ID);
        for symbol in symbols.iter().filter(|s| s.as_str() != home) {
            let raw = rates
                .get(symbol)
                .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.clone()))?;

            let units_per_home = raw
                .as_number()
                .and_then(number_to_decimal)
                .ok_or_else(|| Self::parse_error(format!("{} is not a number: {}", symbol, raw)))?;

            if units_per_home <= Decimal::ZERO {
                return Err(Self::parse_error(format!(
                    "{} has non-positive rate {}",
                    symbol, units_per_home
                )));
            }

            let price = Decimal::ONE
                .checked_div(units_per_home)
                .map(round_price)
                .ok_or_else(|| Self::parse_error(format!("{} rate overflows", symbol)))?;
            if price.is_zero() {
                return Err(Self::parse_error(format!(
                    "{} price rounds to zero",
                    symbol
                )));
            }
            snapshot.rates.insert(symbol.clone(), price);
        }
        snapshot.timestamp = Utc::now();

        Ok(snapshot)
    }
}

#[async_trait]
impl ExchangeRateProvider for ExchangeRateHostProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_home_rates(
        &self,
        home: &str,
        symbols: &[String],
    ) -> Result<HomeRateSnapshot, MarketDataError> {
        let wanted: Vec<&str> = symbols
            .iter()
            .map(String::as_str)
            .filter(|s| *s != home)
            .collect();
        let url = format!("{}/latest", self.base_url);
        debug!("{}: GET {} base={} symbols={:?}", PROVIDER_ID, url, home, wanted);

        let response = self
            .client
            .get(&url)
            .query(&[("base", home), ("symbols", wanted.join(",").as_str())])
            .send()
            .await
            .map_err(|e| MarketDataError::from_request(PROVIDER_ID, e))?;

        let body = read_body(PROVIDER_ID, response).await?;
        Self::parse_latest(&body, home, symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_latest_inverts_rates() {
        let body = r#"{"success":true,"base":"RUB","rates":{"USD":0.0125,"EUR":0.01}}"#;
        let snapshot = ExchangeRateHostProvider::parse_latest(
            body,
            "RUB",
            &symbols(&["RUB", "USD", "EUR"]),
        )
        .unwrap();

        assert_eq!(snapshot.home, "RUB");
        assert_eq!(snapshot.provider, "EXCHANGERATE_HOST");
        assert_eq!(snapshot.price("USD"), Some(dec!(80)));
        assert_eq!(snapshot.price("EUR"), Some(dec!(100)));
        assert_eq!(snapshot.price("RUB"), None);
    }

    #[test]
    fn test_parse_latest_rounds_to_six_places() {
        let body = r#"{"base":"RUB","rates":{"USD":0.011}}"#;
        let snapshot =
            ExchangeRateHostProvider::parse_latest(body, "RUB", &symbols(&["USD"])).unwrap();
        // 1 / 0.011 = 90.909090909...
        assert_eq!(snapshot.price("USD"), Some(dec!(90.909091)));
    }

    #[test]
    fn test_parse_latest_missing_symbol() {
        let body = r#"{"base":"RUB","rates":{"USD":0.011}}"#;
        let err = ExchangeRateHostProvider::parse_latest(body, "RUB", &symbols(&["USD", "EUR"]))
            .unwrap_err();
        assert!(matches!(err, MarketDataError::SymbolNotFound(ref s) if s == "EUR"));
    }

    #[test]
    fn test_parse_latest_rejects_zero_rate() {
        let body = r#"{"base":"RUB","rates":{"USD":0}}"#;
        let err =
            ExchangeRateHostProvider::parse_latest(body, "RUB", &symbols(&["USD"])).unwrap_err();
        assert!(matches!(err, MarketDataError::Parse { .. }));
    }

    #[test]
    fn test_parse_latest_rejects_non_numeric_rate() {
        let body = r#"{"base":"RUB","rates":{"USD":"n/a"}}"#;
        let err =
            ExchangeRateHostProvider::parse_latest(body, "RUB", &symbols(&["USD"])).unwrap_err();
        assert!(matches!(err, MarketDataError::Parse { .. }));
    }

    #[test]
    fn test_parse_latest_failure_flag() {
        let body = r#"{"success":false,"error":{"code":101,"type":"missing_access_key"}}"#;
        let err =
            ExchangeRateHostProvider::parse_latest(body, "RUB", &symbols(&["USD"])).unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderError { .. }));
    }

    #[test]
    fn test_parse_latest_wrong_base() {
        let body = r#"{"base":"EUR","rates":{"USD":1.08}}"#;
        let err =
            ExchangeRateHostProvider::parse_latest(body, "RUB", &symbols(&["USD"])).unwrap_err();
        assert!(matches!(err, MarketDataError::Parse { .. }));
    }

    #[test]
    fn test_parse_latest_malformed_body() {
        let err = ExchangeRateHostProvider::parse_latest("<html>", "RUB", &symbols(&["USD"]))
            .unwrap_err();
        assert!(matches!(err, MarketDataError::Parse { .. }));
    }

    #[test]
    fn test_provider_id() {
        let provider =
            ExchangeRateHostProvider::new(DEFAULT_BASE_URL, Duration::from_secs(5)).unwrap();
        assert_eq!(provider.id(), "EXCHANGERATE_HOST");
        assert!(provider.supports_base("USD"));
    }
}

//! Central Bank of Russia daily rates provider.
//!
//! Reads the JSON mirror of the official daily fixing:
//!
//! ```json
//! {
//!   "Date": "2024-05-17T11:30:00+03:00",
//!   "Valute": {
//!     "USD": { "CharCode": "USD", "Nominal": 1, "Value": 90.5 },
//!     "JPY": { "CharCode": "JPY", "Nominal": 100, "Value": 58.2 }
//!   }
//! }
//! ```
//!
//! `Value` is the RUB price of `Nominal` units, so this provider only quotes
//! against RUB.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
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
const PROVIDER_ID: &str = "CBR";

/// The only base this provider can quote against.
const CBR_BASE: &str = "RUB";

/// Public mirror used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://www.cbr-xml-daily.ru";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DailyResponse {
    #[serde(default)]
    date: Option<String>,
    valute: HashMap<String, Valute>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Valute {
    nominal: u32,
    value: serde_json::Number,
}

pub struct CbrProvider {
    client: Client,
    base_url: String,
}

impl CbrProvider {
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

    pub(crate) fn parse_daily(
        body: &str,
        symbols: &[String],
    ) -> Result<HomeRateSnapshot, MarketDataError> {
        let response: DailyResponse =
            serde_json::from_str(body).map_err(|e| Self::parse_error(e.to_string()))?;

        let mut snapshot = HomeRateSnapshot::new(CBR_BASE, PROVIDER_ID);
        for symbol in symbols.iter().filter(|s| s.as_str() != CBR_BASE) {
            let valute = response
                .valute
                .get(symbol)
                .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.clone()))?;

            if valute.nominal == 0 {
                return Err(Self::parse_error(format!("{} has zero nominal", symbol)));
            }

            let value = number_to_decimal(&valute.value)
                .ok_or_else(|| Self::parse_error(format!("{} value is not a decimal", symbol)))?;
            if value <= Decimal::ZERO {
                return Err(Self::parse_error(format!(
                    "{} has non-positive value {}",
                    symbol, value
                )));
            }

            let price = round_price(value / Decimal::from(valute.nominal));
            snapshot.rates.insert(symbol.clone(), price);
        }

        snapshot.timestamp = response
            .date
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Ok(snapshot)
    }
}

#[async_trait]
impl ExchangeRateProvider for CbrProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn supports_base(&self, base: &str) -> bool {
        base == CBR_BASE
    }

    async fn fetch_home_rates(
        &self,
        home: &str,
        symbols: &[String],
    ) -> Result<HomeRateSnapshot, MarketDataError> {
        if !self.supports_base(home) {
            return Err(MarketDataError::UnsupportedBase {
                provider: PROVIDER_ID.to_string(),
                base: home.to_string(),
            });
        }

        let url = format!("{}/daily_json.js", self.base_url);
        debug!("{}: GET {}", PROVIDER_ID, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MarketDataError::from_request(PROVIDER_ID, e))?;

        let body = read_body(PROVIDER_ID, response).await?;
        Self::parse_daily(&body, symbols)
    }
}

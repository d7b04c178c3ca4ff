//! Exchange-rate provider abstractions and implementations.
//!
//! This module contains:
//! - The `ExchangeRateProvider` trait that all providers implement
//! - Shared HTTP client construction with a bounded timeout
//! - Concrete providers (exchangerate.host, Central Bank of Russia)

mod traits;

pub mod cbr;
pub mod exchangerate_host;

pub use traits::ExchangeRateProvider;

use reqwest::Client;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use std::time::Duration;

use crate::errors::MarketDataError;

/// Default HTTP request timeout. A hung provider must not block the caller.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Decimal places kept for prices in a snapshot.
pub const PRICE_SCALE: u32 = 6;

/// Builds the HTTP client shared by providers.
pub fn build_http_client(timeout: Duration) -> Result<Client, MarketDataError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .map_err(MarketDataError::Network)
}

/// Rounds a price to [`PRICE_SCALE`] places, half-up.
pub(crate) fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a JSON number to a Decimal without going through `f64` arithmetic.
pub(crate) fn number_to_decimal(number: &serde_json::Number) -> Option<Decimal> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Reads a response body, turning non-2xx statuses into provider errors.
pub(crate) async fn read_body(
    provider: &str,
    response: reqwest::Response,
) -> Result<String, MarketDataError> {
    let status = response.status();
    if !status.is_success() {
        return Err(MarketDataError::ProviderError {
            provider: provider.to_string(),
            message: format!("HTTP {}", status),
        });
    }
    response
        .text()
        .await
        .map_err(|e| MarketDataError::from_request(provider, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_price_half_up() {
        assert_eq!(round_price(dec!(0.0111115)), dec!(0.011112));
        assert_eq!(round_price(dec!(0.0111114)), dec!(0.011111));
        assert_eq!(round_price(dec!(90)), dec!(90));
    }

    #[test]
    fn test_number_to_decimal_keeps_text_precision() {
        let n: serde_json::Number = serde_json::from_str("0.010989").unwrap();
        assert_eq!(number_to_decimal(&n), Some(dec!(0.010989)));

        let n: serde_json::Number = serde_json::from_str("1.5e-5").unwrap();
        assert_eq!(number_to_decimal(&n), Some(dec!(0.000015)));
    }
}

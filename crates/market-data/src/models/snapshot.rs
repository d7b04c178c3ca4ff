use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Prices of foreign currencies in a single home currency, taken from one
/// provider response.
///
/// `rates["USD"] == 90.5` with `home == "RUB"` reads "1 USD costs 90.5 RUB".
/// Every value is strictly positive; providers reject anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeRateSnapshot {
    pub home: String,
    pub rates: HashMap<String, Decimal>,
    pub provider: String,
    pub timestamp: DateTime<Utc>,
}

impl HomeRateSnapshot {
    pub fn new(home: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            rates: HashMap::new(),
            provider: provider.into(),
            timestamp: Utc::now(),
        }
    }

    /// Price of one unit of `symbol` in the home currency.
    pub fn price(&self, symbol: &str) -> Option<Decimal> {
        self.rates.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

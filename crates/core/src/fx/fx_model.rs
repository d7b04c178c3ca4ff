use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Currency, FxError};

/// A cached rate: one unit of `from` equals `rate` units of `to`.
///
/// Pairs are directional. `(A, B)` says nothing about `(B, A)`, and `(A, A)`
/// is never stored because it is 1 by definition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RateRecord {
    pub from: Currency,
    pub to: Currency,
    #[serde(serialize_with = "serialize_decimal_6")]
    pub rate: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl RateRecord {
    pub fn new(
        from: Currency,
        to: Currency,
        rate: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, FxError> {
        if from == to {
            return Err(FxError::InvalidRate(format!(
                "{}/{} is an identity pair",
                from, to
            )));
        }
        if rate <= Decimal::ZERO {
            return Err(FxError::InvalidRate(format!(
                "{}/{} must be positive, got {}",
                from, to, rate
            )));
        }
        Ok(Self {
            from,
            to,
            rate,
            updated_at,
        })
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.updated_at)
    }

    /// Fresh while strictly less than `window` has elapsed since the write.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.age(now) < window
    }
}

fn serialize_decimal_6<S>(decimal: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let rounded = decimal.round_dp(6);
    serializer.serialize_str(&rounded.to_string())
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateFreshness {
    Fresh,
    /// Served from an expired cache record because the source failed.
    Stale,
}

/// The resolver's answer for a pair.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRate {
    pub from: Currency,
    pub to: Currency,
    pub rate: Decimal,
    pub freshness: RateFreshness,
    /// When the underlying data was obtained from the source.
    pub as_of: DateTime<Utc>,
}

impl ResolvedRate {
    pub fn identity(currency: Currency, now: DateTime<Utc>) -> Self {
        Self {
            from: currency,
            to: currency,
            rate: Decimal::ONE,
            freshness: RateFreshness::Fresh,
            as_of: now,
        }
    }

    pub fn from_record(record: &RateRecord, freshness: RateFreshness) -> Self {
        Self {
            from: record.from,
            to: record.to,
            rate: record.rate,
            freshness,
            as_of: record.updated_at,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.freshness == RateFreshness::Stale
    }
}

/// An amount converted with a resolved rate.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConvertedAmount {
    pub amount: Decimal,
    pub rate: ResolvedRate,
}

/// One source snapshot: the price of each foreign currency in home currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeRates {
    pub home: Currency,
    pub rates: HashMap<Currency, Decimal>,
    pub provider: String,
    pub fetched_at: DateTime<Utc>,
}

impl HomeRates {
    pub fn new(home: Currency, provider: impl Into<String>) -> Self {
        Self {
            home,
            rates: HashMap::new(),
            provider: provider.into(),
            fetched_at: Utc::now(),
        }
    }

    pub fn with_rate(mut self, currency: Currency, price: Decimal) -> Self {
        self.rates.insert(currency, price);
        self
    }

    /// Price of one unit of `currency` in home terms. The home currency is 1.
    pub fn price(&self, currency: Currency) -> Option<Decimal> {
        if currency == self.home {
            return Some(Decimal::ONE);
        }
        self.rates.get(&currency).copied()
    }
}

/// Outcome of a bulk refresh.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    pub provider: String,
    pub updated: Vec<Currency>,
    pub records_written: usize,
    pub refreshed_at: DateTime<Utc>,
}

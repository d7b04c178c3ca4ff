use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::fx_model::{ConvertedAmount, HomeRates, RateRecord, RefreshSummary, ResolvedRate};
use super::{Currency, FxError};
use crate::errors::Result;

/// Persistent cache of directional rates keyed by `(from, to)`.
///
/// Reads may run concurrently; writes are upserts and the last writer wins.
/// A storage fault is an `Err`, never `Ok(None)`.
#[async_trait]
pub trait RateStoreTrait: Send + Sync {
    fn get_rate(&self, from: Currency, to: Currency) -> Result<Option<RateRecord>>;
    async fn put_rate(&self, record: RateRecord) -> Result<()>;
    /// Upserts all records in one write transaction. Returns the number written.
    async fn put_rates(&self, records: Vec<RateRecord>) -> Result<usize>;
}

/// The external provider, quoting every supported currency in the home currency.
#[async_trait]
pub trait RateSourceTrait: Send + Sync {
    fn home(&self) -> Currency;

    /// One request, all rates. Never retries internally.
    async fn fetch_home_rates(&self) -> std::result::Result<HomeRates, FxError>;
}

/// Trait defining the contract for exchange-rate resolution.
#[async_trait]
pub trait RateResolverTrait: Send + Sync {
    fn home_currency(&self) -> Currency;

    async fn get_rate(&self, from: Currency, to: Currency) -> Result<ResolvedRate>;

    async fn get_rate_at(
        &self,
        from: Currency,
        to: Currency,
        now: DateTime<Utc>,
    ) -> Result<ResolvedRate>;

    async fn get_rate_by_code(&self, from: &str, to: &str) -> Result<ResolvedRate>;

    async fn convert_amount(
        &self,
        amount: Decimal,
        from: Currency,
        to: Currency,
    ) -> Result<ConvertedAmount>;

    async fn refresh_rates(&self) -> Result<RefreshSummary>;
}

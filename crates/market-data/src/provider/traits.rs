//! Exchange-rate provider trait definitions.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::HomeRateSnapshot;

/// Trait for exchange-rate providers.
///
/// A provider answers with the price of every requested symbol in the home
/// currency, from a single request. The call either yields a complete
/// snapshot or fails as a whole; providers never retry on their own.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use fintrack_market_data::{ExchangeRateProvider, HomeRateSnapshot, MarketDataError};
///
/// struct FixedProvider;
///
/// #[async_trait]
/// impl ExchangeRateProvider for FixedProvider {
///     fn id(&self) -> &'static str {
///         "FIXED"
///     }
///
///     async fn fetch_home_rates(
///         &self,
///         home: &str,
///         symbols: &[String],
///     ) -> Result<HomeRateSnapshot, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// Unique identifier for this provider, used in logs and snapshots.
    fn id(&self) -> &'static str;

    /// Whether the provider can quote prices in `base`.
    fn supports_base(&self, _base: &str) -> bool {
        true
    }

    /// Fetch the price of each of `symbols` in `home`.
    ///
    /// Symbols equal to `home` are ignored. A symbol missing from the
    /// response fails the whole call with `SymbolNotFound`.
    async fn fetch_home_rates(
        &self,
        home: &str,
        symbols: &[String],
    ) -> Result<HomeRateSnapshot, MarketDataError>;
}

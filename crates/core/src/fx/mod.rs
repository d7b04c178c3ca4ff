//! FX (Foreign Exchange) module - currencies, rate records, the rate store and
//! source contracts, and the resolver that turns them into exchange rates.

pub mod currency;
mod fx_errors;
mod fx_model;
mod fx_traits;
mod rate_resolver;
mod rate_source;


pub use currency::Currency;
pub use fx_errors::FxError;
pub use fx_model::{
    ConvertedAmount, HomeRates, RateFreshness, RateRecord, RefreshSummary, ResolvedRate,
};
pub use fx_traits::{RateResolverTrait, RateSourceTrait, RateStoreTrait};
pub use rate_resolver::{
    round_amount, round_rate, RateResolver, AMOUNT_SCALE, DEFAULT_FRESHNESS_HOURS, RATE_SCALE,
};
pub use rate_source::ProviderRateSource;

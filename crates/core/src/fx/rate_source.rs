//! Adapter from a market-data provider to the core's `RateSourceTrait`.

use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;

use fintrack_market_data::ExchangeRateProvider;

use super::fx_model::HomeRates;
use super::fx_traits::RateSourceTrait;
use super::{Currency, FxError};

/// Fetches home-currency prices for every supported currency from one provider.
pub struct ProviderRateSource {
    provider: Arc<dyn ExchangeRateProvider>,
    home: Currency,
    symbols: Vec<String>,
}

impl ProviderRateSource {
    pub fn new(provider: Arc<dyn ExchangeRateProvider>, home: Currency) -> Result<Self, FxError> {
        if !provider.supports_base(home.code()) {
            return Err(FxError::Source(format!(
                "provider {} cannot quote against {}",
                provider.id(),
                home
            )));
        }
        let symbols = Currency::foreign_to(home)
            .map(|c| c.code().to_string())
            .collect();
        Ok(Self {
            provider,
            home,
            symbols,
        })
    }

    pub fn provider_id(&self) -> &'static str {
        self.provider.id()
    }
}

#[async_trait]
impl RateSourceTrait for ProviderRateSource {
    fn home(&self) -> Currency {
        self.home
    }

    async fn fetch_home_rates(&self) -> Result<HomeRates, FxError> {
        debug!(
            "Fetching {} rates for {:?} from {}",
            self.home,
            self.symbols,
            self.provider.id()
        );
        let snapshot = self
            .provider
            .fetch_home_rates(self.home.code(), &self.symbols)
            .await?;

        if snapshot.home != self.home.code() {
            return Err(FxError::Parse(format!(
                "expected rates in {}, provider answered in {}",
                self.home, snapshot.home
            )));
        }

        let mut rates = HomeRates::new(self.home, snapshot.provider.clone());
        rates.fetched_at = snapshot.timestamp;
        for symbol in &self.symbols {
            let price = snapshot
                .price(symbol)
                .ok_or_else(|| FxError::SymbolNotQuoted(symbol.clone()))?;
            if price <= rust_decimal::Decimal::ZERO {
                return Err(FxError::InvalidRate(format!(
                    "{} quoted at {}",
                    symbol, price
                )));
            }
            rates.rates.insert(symbol.parse()?, price);
        }

        info!(
            "Fetched {} {} rates from {}",
            rates.rates.len(),
            self.home,
            rates.provider
        );
        Ok(rates)
    }
}

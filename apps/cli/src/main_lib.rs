use std::sync::Arc;

use fintrack_core::{
    balance::BalanceService,
    fx::{ProviderRateSource, RateResolver},
    settings::SettingsService,
};
use fintrack_market_data::{CbrProvider, ExchangeRateHostProvider, ExchangeRateProvider};
use fintrack_storage_sqlite::{
    db::{self, write_actor},
    fx::RateRepository,
    settings::SettingsRepository,
    transactions::TransactionRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, LogFormat, RateProviderKind};

pub struct AppState {
    pub rate_resolver: Arc<RateResolver>,
    /// Direct access for listing the cache.
    pub rate_repository: Arc<RateRepository>,
    pub settings_service: Arc<SettingsService>,
    pub transaction_repository: Arc<TransactionRepository>,
    pub balance_service: Arc<BalanceService>,
}

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn build_provider(config: &Config) -> anyhow::Result<Arc<dyn ExchangeRateProvider>> {
    let provider: Arc<dyn ExchangeRateProvider> = match config.rate_provider {
        RateProviderKind::Cbr => {
            let url = config
                .rate_api_url
                .clone()
                .unwrap_or_else(|| fintrack_market_data::provider::cbr::DEFAULT_BASE_URL.into());
            Arc::new(CbrProvider::new(url, config.request_timeout)?)
        }
        RateProviderKind::ExchangeRateHost => {
            let url = config.rate_api_url.clone().unwrap_or_else(|| {
                fintrack_market_data::provider::exchangerate_host::DEFAULT_BASE_URL.into()
            });
            Arc::new(ExchangeRateHostProvider::new(url, config.request_timeout)?)
        }
    };
    Ok(provider)
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone())?;

    let provider = build_provider(config)?;
    let source = Arc::new(ProviderRateSource::new(provider, config.home_currency)?);
    tracing::info!(
        "Rates quoted in {} by {}",
        config.home_currency,
        source.provider_id()
    );

    let rate_repository = Arc::new(RateRepository::new(pool.clone(), writer.clone()));
    let rate_resolver = Arc::new(
        RateResolver::new(rate_repository.clone(), source).with_freshness_window(config.rate_ttl),
    );

    let settings_repository = Arc::new(SettingsRepository::new(pool.clone(), writer.clone()));
    let settings_service = Arc::new(SettingsService::new(settings_repository));

    let transaction_repository = Arc::new(TransactionRepository::new(pool.clone()));
    let balance_service = Arc::new(BalanceService::new(
        rate_resolver.clone(),
        transaction_repository.clone(),
        settings_service.clone(),
    ));

    Ok(Arc::new(AppState {
        rate_resolver,
        rate_repository,
        settings_service,
        transaction_repository,
        balance_service,
    }))
}

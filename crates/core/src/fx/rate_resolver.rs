use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info, warn};
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::fx_model::{
    ConvertedAmount, HomeRates, RateFreshness, RateRecord, RefreshSummary, ResolvedRate,
};
use super::fx_traits::{RateResolverTrait, RateSourceTrait, RateStoreTrait};
use super::{Currency, FxError};
use crate::errors::{Error, Result, ValidationError};

/// Decimal places kept for stored and derived rates.
pub const RATE_SCALE: u32 = 6;
/// Decimal places kept for converted money amounts.
pub const AMOUNT_SCALE: u32 = 2;
/// How long a cached rate is served without asking the source.
pub const DEFAULT_FRESHNESS_HOURS: i64 = 24;

pub fn round_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Result of the source fetch for a single resolution. Filled on first use
/// and shared by both legs of a cross rate.
#[derive(Default)]
struct SnapshotSlot(Option<std::result::Result<HomeRates, FxError>>);

/// Resolves the rate for any pair of supported currencies.
///
/// Only `X -> home` prices come from the source. Every other pair is derived
/// from two of them:
///
/// ```text
/// rate(A, B) = round6(to_home(A) / to_home(B))
/// ```
///
/// Results are written back to the store so fresh pairs are served from
/// cache. When the source fails, expired records are served and flagged
/// `Stale`.
pub struct RateResolver {
    store: Arc<dyn RateStoreTrait>,
    source: Arc<dyn RateSourceTrait>,
    home: Currency,
    freshness_window: Duration,
}

impl RateResolver {
    /// The home currency is the one the source quotes against.
    pub fn new(store: Arc<dyn RateStoreTrait>, source: Arc<dyn RateSourceTrait>) -> Self {
        let home = source.home();
        Self {
            store,
            source,
            home,
            freshness_window: Duration::hours(DEFAULT_FRESHNESS_HOURS),
        }
    }

    pub fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }

    pub fn freshness_window(&self) -> Duration {
        self.freshness_window
    }

    /// Bulk refresh with an explicit clock.
    ///
    /// One source call. Every quoted currency gets its `(X, home)` record and
    /// the reciprocal `(home, X)`, all written in one batch.
    pub async fn refresh_rates_at(&self, now: DateTime<Utc>) -> Result<RefreshSummary> {
        let rates = self.fetch_with_retry().await?;

        let mut records = Vec::new();
        let mut updated = Vec::new();
        for currency in Currency::foreign_to(self.home) {
            let Some(price) = rates.price(currency).filter(|p| *p > Decimal::ZERO) else {
                warn!("Refresh: {} has no usable {} price", currency, self.home);
                continue;
            };
            records.push(RateRecord::new(currency, self.home, price, now)?);
            if let Some(inverse) = Decimal::ONE
                .checked_div(price)
                .map(round_rate)
                .filter(|r| *r > Decimal::ZERO)
            {
                records.push(RateRecord::new(self.home, currency, inverse, now)?);
            }
            updated.push(currency);
        }

        let records_written = self.store.put_rates(records).await?;
        info!(
            "Refreshed {} rates against {} from {} ({} records)",
            updated.len(),
            self.home,
            rates.provider,
            records_written
        );

        Ok(RefreshSummary {
            provider: rates.provider,
            updated,
            records_written,
            refreshed_at: now,
        })
    }

    /// Runs a bulk refresh on the tokio runtime without blocking the caller.
    pub fn spawn_refresh(self: Arc<Self>) -> JoinHandle<Result<RefreshSummary>> {
        tokio::spawn(async move {
            let result = self.refresh_rates().await;
            if let Err(e) = &result {
                error!("Background rate refresh failed: {}", e);
            }
            result
        })
    }

    async fn fetch_with_retry(&self) -> std::result::Result<HomeRates, FxError> {
        let rates = match self.source.fetch_home_rates().await {
            Err(e) if e.is_transient() => {
                warn!("Rate source failed ({}), retrying once", e);
                self.source.fetch_home_rates().await?
            }
            other => other?,
        };
        if rates.home != self.home {
            return Err(FxError::Parse(format!(
                "expected rates against {}, got {}",
                self.home, rates.home
            )));
        }
        Ok(rates)
    }

    async fn snapshot<'a>(
        &self,
        slot: &'a mut SnapshotSlot,
    ) -> std::result::Result<&'a HomeRates, FxError> {
        let outcome = match slot.0.take() {
            Some(outcome) => outcome,
            None => self.fetch_with_retry().await,
        };
        slot.0.insert(outcome).as_ref().map_err(|e| e.clone())
    }

    async fn fetched_price(
        &self,
        currency: Currency,
        slot: &mut SnapshotSlot,
    ) -> std::result::Result<Decimal, FxError> {
        let rates = self.snapshot(slot).await?;
        match rates.price(currency) {
            Some(price) if price > Decimal::ZERO => Ok(price),
            Some(price) => Err(FxError::InvalidRate(format!(
                "{} quoted at {}",
                currency, price
            ))),
            None => Err(FxError::SymbolNotQuoted(currency.code().to_string())),
        }
    }

    /// Cached `(X, home)` record, or `None` for the home currency itself.
    fn cached_home_leg(&self, currency: Currency) -> Result<Option<RateRecord>> {
        if currency == self.home {
            return Ok(None);
        }
        self.store.get_rate(currency, self.home)
    }

    /// Price of one unit of `currency` in home terms.
    async fn home_leg(
        &self,
        currency: Currency,
        cached: Option<RateRecord>,
        now: DateTime<Utc>,
        slot: &mut SnapshotSlot,
    ) -> Result<ResolvedRate> {
        if currency == self.home {
            return Ok(ResolvedRate::identity(self.home, now));
        }

        if let Some(record) = cached
            .as_ref()
            .filter(|r| r.is_fresh(now, self.freshness_window))
        {
            debug!("Cache hit {}/{}", currency, self.home);
            return Ok(ResolvedRate::from_record(record, RateFreshness::Fresh));
        }

        match self.fetched_price(currency, slot).await {
            Ok(price) => {
                let record = RateRecord::new(currency, self.home, price, now)?;
                self.store.put_rate(record.clone()).await?;
                Ok(ResolvedRate::from_record(&record, RateFreshness::Fresh))
            }
            Err(err) => match cached {
                Some(record) => {
                    warn!(
                        "Serving stale {}/{} from {}: {}",
                        currency, self.home, record.updated_at, err
                    );
                    Ok(ResolvedRate::from_record(&record, RateFreshness::Stale))
                }
                None => Err(FxError::RateUnavailable {
                    from: currency.code().to_string(),
                    to: self.home.code().to_string(),
                    reason: err.to_string(),
                }
                .into()),
            },
        }
    }

    /// A direct record may be served only while it is newer than every input
    /// it was derived from and those inputs are themselves still fresh.
    fn is_consistent_hit(
        &self,
        direct: &RateRecord,
        legs: [&Option<RateRecord>; 2],
        now: DateTime<Utc>,
    ) -> bool {
        if !direct.is_fresh(now, self.freshness_window) {
            return false;
        }
        [direct.from, direct.to]
            .into_iter()
            .zip(legs)
            .filter(|(currency, _)| *currency != self.home)
            .all(|(_, leg)| {
                leg.as_ref().is_some_and(|r| {
                    r.is_fresh(now, self.freshness_window) && direct.updated_at >= r.updated_at
                })
            })
    }

    async fn resolve_to_home(&self, from: Currency, now: DateTime<Utc>) -> Result<ResolvedRate> {
        let cached = self.cached_home_leg(from)?;
        let mut slot = SnapshotSlot::default();
        self.home_leg(from, cached, now, &mut slot).await
    }

    async fn resolve_derived(
        &self,
        from: Currency,
        to: Currency,
        now: DateTime<Utc>,
    ) -> Result<ResolvedRate> {
        let from_leg = self.cached_home_leg(from)?;
        let to_leg = self.cached_home_leg(to)?;
        let direct = self.store.get_rate(from, to)?;

        if let Some(record) = direct.as_ref() {
            if self.is_consistent_hit(record, [&from_leg, &to_leg], now) {
                debug!("Cache hit {}/{}", from, to);
                return Ok(ResolvedRate::from_record(record, RateFreshness::Fresh));
            }
        }

        let mut slot = SnapshotSlot::default();
        let legs = match self.home_leg(from, from_leg, now, &mut slot).await {
            Ok(numerator) => self
                .home_leg(to, to_leg, now, &mut slot)
                .await
                .map(|denominator| (numerator, denominator)),
            Err(e) => Err(e),
        };

        let (numerator, denominator) = match legs {
            Ok(legs) => legs,
            Err(Error::Fx(FxError::RateUnavailable {
                from: leg, reason, ..
            })) => {
                return match direct {
                    Some(record) => {
                        let freshness = if record.is_fresh(now, self.freshness_window) {
                            RateFreshness::Fresh
                        } else {
                            RateFreshness::Stale
                        };
                        warn!(
                            "Serving {}/{} from {} without {} input: {}",
                            from, to, record.updated_at, leg, reason
                        );
                        Ok(ResolvedRate::from_record(&record, freshness))
                    }
                    None => Err(FxError::RateUnavailable {
                        from: from.code().to_string(),
                        to: to.code().to_string(),
                        reason: format!("no {} rate: {}", leg, reason),
                    }
                    .into()),
                };
            }
            Err(e) => return Err(e),
        };

        let rate = numerator
            .rate
            .checked_div(denominator.rate)
            .map(round_rate)
            .filter(|r| *r > Decimal::ZERO)
            .ok_or_else(|| FxError::RateUnavailable {
                from: from.code().to_string(),
                to: to.code().to_string(),
                reason: format!(
                    "cannot derive from {} and {}",
                    numerator.rate, denominator.rate
                ),
            })?;

        let freshness = if numerator.is_stale() || denominator.is_stale() {
            RateFreshness::Stale
        } else {
            let record = RateRecord::new(from, to, rate, now)?;
            self.store.put_rate(record).await?;
            RateFreshness::Fresh
        };

        Ok(ResolvedRate {
            from,
            to,
            rate,
            freshness,
            as_of: numerator.as_of.min(denominator.as_of),
        })
    }
}

#[async_trait]
impl RateResolverTrait for RateResolver {
    fn home_currency(&self) -> Currency {
        self.home
    }

    async fn get_rate(&self, from: Currency, to: Currency) -> Result<ResolvedRate> {
        self.get_rate_at(from, to, Utc::now()).await
    }

    async fn get_rate_at(
        &self,
        from: Currency,
        to: Currency,
        now: DateTime<Utc>,
    ) -> Result<ResolvedRate> {
        if from == to {
            return Ok(ResolvedRate::identity(from, now));
        }
        if to == self.home {
            self.resolve_to_home(from, now).await
        } else {
            self.resolve_derived(from, to, now).await
        }
    }

    async fn get_rate_by_code(&self, from: &str, to: &str) -> Result<ResolvedRate> {
        let from: Currency = from.parse()?;
        let to: Currency = to.parse()?;
        self.get_rate(from, to).await
    }

    async fn convert_amount(
        &self,
        amount: Decimal,
        from: Currency,
        to: Currency,
    ) -> Result<ConvertedAmount> {
        let rate = self.get_rate(from, to).await?;
        if from == to {
            return Ok(ConvertedAmount { amount, rate });
        }
        let converted = amount.checked_mul(rate.rate).ok_or_else(|| {
            ValidationError::InvalidInput(format!(
                "{} {} is too large to convert to {}",
                amount, from, to
            ))
        })?;
        Ok(ConvertedAmount {
            amount: round_amount(converted),
            rate,
        })
    }

    async fn refresh_rates(&self) -> Result<RefreshSummary> {
        self.refresh_rates_at(Utc::now()).await
    }
}

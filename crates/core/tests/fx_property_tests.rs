//! Property-based integration tests for rate resolution.
//!
//! Every rate is derived from home-relative prices, so reciprocal and
//! transitive lookups must agree up to six-decimal rounding.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use fintrack_core::fx::{
    round_rate, Currency, FxError, HomeRates, RateRecord, RateResolver, RateResolverTrait,
    RateSourceTrait, RateStoreTrait,
};
use fintrack_core::Result;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// =============================================================================
// Fixtures
// =============================================================================

#[derive(Default)]
struct MemoryStore {
    records: Mutex<HashMap<(Currency, Currency), RateRecord>>,
}

#[async_trait]
impl RateStoreTrait for MemoryStore {
    fn get_rate(&self, from: Currency, to: Currency) -> Result<Option<RateRecord>> {
        Ok(self.records.lock().unwrap().get(&(from, to)).cloned())
    }

    async fn put_rate(&self, record: RateRecord) -> Result<()> {
        self.records
            .lock()
            .unwrap()
            .insert((record.from, record.to), record);
        Ok(())
    }

    async fn put_rates(&self, records: Vec<RateRecord>) -> Result<usize> {
        let count = records.len();
        for record in records {
            self.put_rate(record).await?;
        }
        Ok(count)
    }
}

struct FixedSource {
    rates: HomeRates,
    calls: AtomicUsize,
}

#[async_trait]
impl RateSourceTrait for FixedSource {
    fn home(&self) -> Currency {
        self.rates.home
    }

    async fn fetch_home_rates(&self) -> std::result::Result<HomeRates, FxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.rates.clone())
    }
}

fn clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
}

fn resolver_for(home: Currency, prices: &[Decimal]) -> (RateResolver, Arc<FixedSource>) {
    let rates = Currency::foreign_to(home)
        .zip(prices.iter().copied())
        .fold(HomeRates::new(home, "FIXED"), |acc, (currency, price)| {
            acc.with_rate(currency, price)
        });
    let source = Arc::new(FixedSource {
        rates,
        calls: AtomicUsize::new(0),
    });
    let resolver = RateResolver::new(Arc::new(MemoryStore::default()), source.clone());
    (resolver, source)
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

// =============================================================================
// Generators
// =============================================================================

fn arb_currency() -> impl Strategy<Value = Currency> {
    prop::sample::select(Currency::ALL.to_vec())
}

/// Home-currency price between 0.5 and 200 with four decimals.
fn arb_price() -> impl Strategy<Value = Decimal> {
    (5_000i64..=2_000_000i64).prop_map(|n| Decimal::new(n, 4))
}

fn arb_prices() -> impl Strategy<Value = Vec<Decimal>> {
    proptest::collection::vec(arb_price(), Currency::ALL.len() - 1)
}

fn within(actual: Decimal, expected: Decimal, relative: Decimal) -> bool {
    (actual - expected).abs() <= expected.abs() * relative + Decimal::new(1, 6)
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// rate(A, B) * rate(B, A) stays within rounding distance of one.
    #[test]
    fn prop_reciprocal_rates(
        home in arb_currency(),
        prices in arb_prices(),
        a in arb_currency(),
        b in arb_currency(),
    ) {
        let (resolver, _) = resolver_for(home, &prices);
        let (ab, ba) = block_on(async {
            let ab = resolver.get_rate_at(a, b, clock()).await.unwrap();
            let ba = resolver.get_rate_at(b, a, clock()).await.unwrap();
            (ab.rate, ba.rate)
        });

        prop_assert!(ab > Decimal::ZERO);
        prop_assert!(within(ab * ba, Decimal::ONE, Decimal::new(1, 3)), "{} * {}", ab, ba);
    }

    /// rate(home, X) is exactly round6(1 / rate(X, home)), whichever is asked first.
    #[test]
    fn prop_home_reciprocal_is_exact(
        home in arb_currency(),
        prices in arb_prices(),
        x in arb_currency(),
        home_first in any::<bool>(),
    ) {
        prop_assume!(x != home);
        let (resolver, _) = resolver_for(home, &prices);
        let (to_home, from_home) = block_on(async {
            if home_first {
                let from_home = resolver.get_rate_at(home, x, clock()).await.unwrap();
                let to_home = resolver.get_rate_at(x, home, clock()).await.unwrap();
                (to_home.rate, from_home.rate)
            } else {
                let to_home = resolver.get_rate_at(x, home, clock()).await.unwrap();
                let from_home = resolver.get_rate_at(home, x, clock()).await.unwrap();
                (to_home.rate, from_home.rate)
            }
        });

        prop_assert_eq!(from_home, round_rate(Decimal::ONE / to_home));
    }

    /// rate(X, Z) agrees with rate(X, Y) * rate(Y, Z).
    #[test]
    fn prop_transitive_rates(
        home in arb_currency(),
        prices in arb_prices(),
        x in arb_currency(),
        y in arb_currency(),
        z in arb_currency(),
    ) {
        let (resolver, _) = resolver_for(home, &prices);
        let (xz, xy, yz) = block_on(async {
            let xz = resolver.get_rate_at(x, z, clock()).await.unwrap().rate;
            let xy = resolver.get_rate_at(x, y, clock()).await.unwrap().rate;
            let yz = resolver.get_rate_at(y, z, clock()).await.unwrap().rate;
            (xz, xy, yz)
        });

        prop_assert!(within(xy * yz, xz, Decimal::new(1, 3)), "{} * {} vs {}", xy, yz, xz);
    }

    /// Identity pairs never reach the source.
    #[test]
    fn prop_identity_is_one(home in arb_currency(), prices in arb_prices(), c in arb_currency()) {
        let (resolver, source) = resolver_for(home, &prices);
        let rate = block_on(resolver.get_rate_at(c, c, clock())).unwrap();

        prop_assert_eq!(rate.rate, Decimal::ONE);
        prop_assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    /// A second lookup inside the window never calls the source again.
    #[test]
    fn prop_fresh_cache_avoids_source(
        prices in arb_prices(),
        a in arb_currency(),
        b in arb_currency(),
        later_secs in 0i64..(24 * 3600),
    ) {
        let (resolver, source) = resolver_for(Currency::Rub, &prices);
        let (first, second) = block_on(async {
            let first = resolver.get_rate_at(a, b, clock()).await.unwrap();
            let second = resolver
                .get_rate_at(a, b, clock() + Duration::seconds(later_secs))
                .await
                .unwrap();
            (first, second)
        });

        prop_assert_eq!(first.rate, second.rate);
        prop_assert!(source.calls.load(Ordering::SeqCst) <= 1);
    }
}

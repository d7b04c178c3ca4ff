use async_trait::async_trait;
use diesel::prelude::*;
use log::debug;
use std::sync::Arc;

use fintrack_core::errors::Result;
use fintrack_core::fx::{Currency, FxError, RateRecord, RateStoreTrait};

use super::model::ExchangeRateDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::exchange_rates;

/// Exchange-rate cache on SQLite.
///
/// Reads use the pool; writes go through the single writer.
#[derive(Clone)]
pub struct RateRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl RateRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    /// Every cached record, ordered by pair.
    pub fn list_rates(&self) -> Result<Vec<RateRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = exchange_rates::table
            .select(ExchangeRateDB::as_select())
            .order((exchange_rates::from_currency, exchange_rates::to_currency))
            .load::<ExchangeRateDB>(&mut conn)
            .into_core()?;

        rows.into_iter().map(RateRecord::try_from).collect()
    }

    fn to_rows(records: &[RateRecord]) -> Result<Vec<ExchangeRateDB>> {
        records
            .iter()
            .map(|record| {
                if record.from == record.to || record.rate <= rust_decimal::Decimal::ZERO {
                    return Err(FxError::InvalidRate(format!(
                        "refusing to store {}/{} = {}",
                        record.from, record.to, record.rate
                    ))
                    .into());
                }
                Ok(ExchangeRateDB::from(record))
            })
            .collect()
    }
}

#[async_trait]
impl RateStoreTrait for RateRepository {
    fn get_rate(&self, from: Currency, to: Currency) -> Result<Option<RateRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let row = exchange_rates::table
            .filter(exchange_rates::from_currency.eq(from.code()))
            .filter(exchange_rates::to_currency.eq(to.code()))
            .select(ExchangeRateDB::as_select())
            .first::<ExchangeRateDB>(&mut conn)
            .optional()
            .into_core()?;

        row.map(RateRecord::try_from).transpose()
    }

    async fn put_rate(&self, record: RateRecord) -> Result<()> {
        self.put_rates(vec![record]).await.map(|_| ())
    }

    async fn put_rates(&self, records: Vec<RateRecord>) -> Result<usize> {
        let rows = Self::to_rows(&records)?;
        if rows.is_empty() {
            return Ok(0);
        }

        let written = self
            .writer
            .exec(move |conn| {
                let mut written = 0;
                for row in &rows {
                    written += diesel::replace_into(exchange_rates::table)
                        .values(row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(written)
            })
            .await?;

        debug!("Stored {} exchange rate record(s)", written);
        Ok(written)
    }
}

//! Database model for cached exchange rates.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use fintrack_core::errors::{DatabaseError, Error, Result};
use fintrack_core::fx::{Currency, RateRecord};

/// Database model for one directional rate.
#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::exchange_rates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateDB {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: String,
    pub updated_at: String,
}

fn corrupt(row: &ExchangeRateDB, detail: impl std::fmt::Display) -> Error {
    Error::Database(DatabaseError::CorruptRecord(format!(
        "exchange_rates {}/{}: {}",
        row.from_currency, row.to_currency, detail
    )))
}

impl From<&RateRecord> for ExchangeRateDB {
    fn from(record: &RateRecord) -> Self {
        Self {
            from_currency: record.from.code().to_string(),
            to_currency: record.to.code().to_string(),
            rate: record.rate.to_string(),
            updated_at: record
                .updated_at
                .to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

impl TryFrom<ExchangeRateDB> for RateRecord {
    type Error = Error;

    /// A row that does not describe a valid rate is a storage fault, not a miss.
    fn try_from(row: ExchangeRateDB) -> Result<Self> {
        let from = Currency::from_str(&row.from_currency).map_err(|e| corrupt(&row, e))?;
        let to = Currency::from_str(&row.to_currency).map_err(|e| corrupt(&row, e))?;
        let rate = Decimal::from_str(row.rate.trim()).map_err(|e| corrupt(&row, e))?;
        let updated_at = DateTime::parse_from_rfc3339(&row.updated_at)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|e| corrupt(&row, e))?;

        RateRecord::new(from, to, rate, updated_at).map_err(|e| corrupt(&row, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn row(rate: &str, updated_at: &str) -> ExchangeRateDB {
        ExchangeRateDB {
            from_currency: "USD".to_string(),
            to_currency: "RUB".to_string(),
            rate: rate.to_string(),
            updated_at: updated_at.to_string(),
        }
    }

    #[test]
    fn test_row_round_trip_keeps_precision() {
        let record = RateRecord::new(
            Currency::Usd,
            Currency::Rub,
            dec!(90.123456),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
        .unwrap();

        let db = ExchangeRateDB::from(&record);
        assert_eq!(db.rate, "90.123456");
        assert_eq!(db.updated_at, "2024-05-01T12:00:00.000000Z");
        assert_eq!(RateRecord::try_from(db).unwrap(), record);
    }

    #[test]
    fn test_corrupt_rows_are_errors() {
        for bad in [
            row("abc", "2024-05-01T12:00:00Z"),
            row("0", "2024-05-01T12:00:00Z"),
            row("-1.5", "2024-05-01T12:00:00Z"),
            row("90", "yesterday"),
        ] {
            let err = RateRecord::try_from(bad).unwrap_err();
            assert!(matches!(
                err,
                Error::Database(DatabaseError::CorruptRecord(_))
            ));
        }

        let mut unknown = row("90", "2024-05-01T12:00:00Z");
        unknown.from_currency = "XAU".to_string();
        assert!(RateRecord::try_from(unknown).unwrap_err().is_storage());
    }
}

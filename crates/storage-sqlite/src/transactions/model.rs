//! Database model for transactions joined with their category type.

use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use fintrack_core::balance::{Transaction, TransactionKind};
use fintrack_core::errors::{DatabaseError, Error, Result};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// One `transactions` row with the `type` of its category, if any.
#[derive(Queryable, Debug, Clone)]
pub struct TransactionRowDB {
    pub id: i64,
    pub title: String,
    pub amount: String,
    pub currency: String,
    pub date: String,
    pub category_type: Option<String>,
}

impl TryFrom<TransactionRowDB> for Transaction {
    type Error = Error;

    fn try_from(row: TransactionRowDB) -> Result<Self> {
        let corrupt = |detail: String| {
            Error::Database(DatabaseError::CorruptRecord(format!(
                "transactions #{}: {}",
                row.id, detail
            )))
        };

        let amount = Decimal::from_str(row.amount.trim()).map_err(|e| corrupt(e.to_string()))?;
        let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT)
            .map_err(|e| corrupt(format!("date '{}': {}", row.date, e)))?;
        let kind = row
            .category_type
            .as_deref()
            .map(TransactionKind::from_str)
            .transpose()
            .map_err(|e| corrupt(e.to_string()))?;

        Ok(Transaction {
            id: row.id,
            title: row.title,
            amount,
            currency: row.currency,
            date,
            kind,
        })
    }
}

//! Balance domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;
use crate::fx::Currency;

/// Direction of a transaction, taken from its category type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(ValidationError::InvalidInput(format!(
                "unknown category type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded transaction as the aggregator consumes it.
///
/// `currency` is raw text because stored rows may carry codes the tracker no
/// longer supports. It is validated during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub title: String,
    pub amount: Decimal,
    pub currency: String,
    pub date: NaiveDate,
    /// `None` when the transaction has no category. Counted as an expense.
    pub kind: Option<TransactionKind>,
}

impl Transaction {
    pub fn effective_kind(&self) -> TransactionKind {
        self.kind.unwrap_or(TransactionKind::Expense)
    }
}

/// A transaction left out of an aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedTransaction {
    pub transaction_id: i64,
    pub currency: String,
    pub reason: String,
}

/// Totals in a single currency, rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub currency: Currency,
    /// `income - expense`
    pub total: Decimal,
    pub income: Decimal,
    pub expense: Decimal,
    pub skipped: Vec<SkippedTransaction>,
    /// At least one contributing rate was served stale.
    pub degraded: bool,
}

impl AggregateResult {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

use async_trait::async_trait;

use super::balance_model::{AggregateResult, Transaction};
use crate::errors::Result;
use crate::fx::Currency;

/// Read-only access to recorded transactions.
pub trait TransactionRepositoryTrait: Send + Sync {
    fn list_transactions(&self) -> Result<Vec<Transaction>>;
}

/// Trait defining the contract for balance aggregation.
#[async_trait]
pub trait BalanceServiceTrait: Send + Sync {
    /// Sums `transactions` in `main_currency`.
    ///
    /// A transaction whose currency is unsupported or whose rate cannot be
    /// resolved is skipped and reported. A storage failure aborts the call.
    async fn aggregate(
        &self,
        transactions: &[Transaction],
        main_currency: Currency,
    ) -> Result<AggregateResult>;

    /// Aggregates every stored transaction in the configured main currency.
    async fn calculate_balance(&self) -> Result<AggregateResult>;
}

use async_trait::async_trait;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use super::balance_model::{AggregateResult, SkippedTransaction, Transaction, TransactionKind};
use super::balance_traits::{BalanceServiceTrait, TransactionRepositoryTrait};
use crate::errors::{Error, Result, ValidationError};
use crate::fx::{round_amount, Currency, FxError, RateResolverTrait, ResolvedRate};
use crate::settings::SettingsServiceTrait;

/// Aggregates transactions in the user's main currency.
pub struct BalanceService {
    rate_resolver: Arc<dyn RateResolverTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    settings_service: Arc<dyn SettingsServiceTrait>,
}

impl BalanceService {
    pub fn new(
        rate_resolver: Arc<dyn RateResolverTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        settings_service: Arc<dyn SettingsServiceTrait>,
    ) -> Self {
        Self {
            rate_resolver,
            transaction_repository,
            settings_service,
        }
    }

    /// Rate from `currency` to `main`, looked up once per aggregate call.
    async fn rate_for(
        &self,
        rates: &mut HashMap<Currency, std::result::Result<ResolvedRate, FxError>>,
        currency: Currency,
        main: Currency,
    ) -> Result<std::result::Result<ResolvedRate, FxError>> {
        if let Some(known) = rates.get(&currency) {
            return Ok(known.clone());
        }
        let outcome = match self.rate_resolver.get_rate(currency, main).await {
            Ok(rate) => Ok(rate),
            Err(Error::Fx(e)) => Err(e),
            Err(e) => return Err(e),
        };
        rates.insert(currency, outcome.clone());
        Ok(outcome)
    }
}

#[async_trait]
impl BalanceServiceTrait for BalanceService {
    async fn aggregate(
        &self,
        transactions: &[Transaction],
        main_currency: Currency,
    ) -> Result<AggregateResult> {
        let mut income = Decimal::ZERO;
        let mut expense = Decimal::ZERO;
        let mut skipped = Vec::new();
        let mut degraded = false;
        let mut rates = HashMap::new();

        for tx in transactions {
            let skip = |reason: String| SkippedTransaction {
                transaction_id: tx.id,
                currency: tx.currency.clone(),
                reason,
            };

            let currency: Currency = match tx.currency.parse() {
                Ok(c) => c,
                Err(e) => {
                    warn!("Skipping transaction {}: {}", tx.id, e);
                    skipped.push(skip(e.to_string()));
                    continue;
                }
            };

            let amount = if currency == main_currency {
                tx.amount
            } else {
                let rate = match self.rate_for(&mut rates, currency, main_currency).await? {
                    Ok(rate) => rate,
                    Err(e) => {
                        warn!("Skipping transaction {}: {}", tx.id, e);
                        skipped.push(skip(e.to_string()));
                        continue;
                    }
                };
                let Some(converted) = tx.amount.checked_mul(rate.rate) else {
                    warn!("Skipping transaction {}: amount overflow", tx.id);
                    skipped.push(skip(format!(
                        "{} {} overflows when converted",
                        tx.amount, currency
                    )));
                    continue;
                };
                degraded |= rate.is_stale();
                round_amount(converted)
            };

            let kind = tx.effective_kind();
            let bucket = match kind {
                TransactionKind::Income => &mut income,
                TransactionKind::Expense => &mut expense,
            };
            let Some(sum) = bucket.checked_add(amount) else {
                warn!("Skipping transaction {}: total overflow", tx.id);
                skipped.push(skip(format!(
                    "{} {} overflows the {} total",
                    amount, main_currency, kind
                )));
                continue;
            };
            *bucket = sum;
        }

        let income = round_amount(income);
        let expense = round_amount(expense);
        let total = income.checked_sub(expense).ok_or_else(|| {
            ValidationError::InvalidInput(format!(
                "balance of {} income and {} expense overflows in {}",
                income, expense, main_currency
            ))
        })?;
        debug!(
            "Aggregated {} transactions in {} ({} skipped)",
            transactions.len(),
            main_currency,
            skipped.len()
        );

        Ok(AggregateResult {
            currency: main_currency,
            total,
            income,
            expense,
            skipped,
            degraded,
        })
    }

    async fn calculate_balance(&self) -> Result<AggregateResult> {
        let main_currency = self.settings_service.get_main_currency()?;
        let transactions = self.transaction_repository.list_transactions()?;
        self.aggregate(&transactions, main_currency).await
    }
}

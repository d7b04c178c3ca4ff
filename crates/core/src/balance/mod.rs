//! Balance aggregation: signed totals of transactions in the main currency.

mod balance_model;
mod balance_service;
mod balance_traits;


pub use balance_model::{AggregateResult, SkippedTransaction, Transaction, TransactionKind};
pub use balance_service::BalanceService;
pub use balance_traits::{BalanceServiceTrait, TransactionRepositoryTrait};

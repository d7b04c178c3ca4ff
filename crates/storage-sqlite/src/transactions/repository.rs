use diesel::prelude::*;
use std::sync::Arc;

use fintrack_core::balance::{Transaction, TransactionRepositoryTrait};
use fintrack_core::errors::Result;

use super::model::TransactionRowDB;
use crate::db::{get_connection, DbPool};
use crate::errors::IntoCore;
use crate::schema::{categories, transactions};

pub struct TransactionRepository {
    pool: Arc<DbPool>,
}

impl TransactionRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl TransactionRepositoryTrait for TransactionRepository {
    fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = transactions::table
            .left_join(categories::table)
            .select((
                transactions::id,
                transactions::title,
                transactions::amount,
                transactions::currency,
                transactions::date,
                categories::category_type.nullable(),
            ))
            .order((transactions::date.asc(), transactions::id.asc()))
            .load::<TransactionRowDB>(&mut conn)
            .into_core()?;

        rows.into_iter().map(Transaction::try_from).collect()
    }
}

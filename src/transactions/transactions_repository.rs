use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::db::get_connection;
use crate::errors::{DatabaseError, Error, Result};
use crate::schema::transactions;
use crate::transactions::transactions_model::{
    Transaction, TransactionDb, TransactionFilters, TransactionSearchResponse,
    TransactionSearchResponseMeta, TransactionUpdateDb,
};

/// Repository for transactions, including the paired writes and deletes
/// that keep internal transfers atomic.
pub struct TransactionRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl TransactionRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    pub fn get_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;
        transactions::table
            .find(transaction_id)
            .first::<TransactionDb>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Transaction '{}' not found", transaction_id),
                )),
                other => Error::from(other),
            })
            .and_then(Transaction::try_from)
    }

    pub fn search_transactions(
        &self,
        page: i64,
        page_size: i64,
        filters: &TransactionFilters,
    ) -> Result<TransactionSearchResponse> {
        let mut conn = get_connection(&self.pool)?;

        let build_query = || {
            let mut query = transactions::table.into_boxed();
            if let Some(ref account_id) = filters.account_id {
                query = query.filter(transactions::account_id.eq(account_id.clone()));
            }
            if let Some(ref category) = filters.category {
                query = query.filter(transactions::category.eq(category.clone()));
            }
            if let Some(start) = filters.start_date {
                query = query.filter(transactions::transaction_date.ge(start.naive_utc()));
            }
            if let Some(end) = filters.end_date {
                query = query.filter(transactions::transaction_date.le(end.naive_utc()));
            }
            query
        };

        let total_row_count = build_query().count().get_result::<i64>(&mut conn)?;

        let offset = (page.max(1) - 1) * page_size;
        let data = build_query()
            .order((
                transactions::transaction_date.desc(),
                transactions::created_at.desc(),
            ))
            .limit(page_size)
            .offset(offset)
            .load::<TransactionDb>(&mut conn)
            .map_err(Error::from)?
            .into_iter()
            .map(Transaction::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(TransactionSearchResponse {
            data,
            meta: TransactionSearchResponseMeta { total_row_count },
        })
    }

    /// Non-transfer transactions inside an optional date window, optionally
    /// scoped to one account. Drives summaries, trends and charts.
    pub fn list_non_transfer(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        account_id: Option<&str>,
    ) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = transactions::table
            .filter(transactions::is_internal_transfer.eq(false))
            .into_boxed();

        if let Some(start) = start {
            query = query.filter(transactions::transaction_date.ge(start.naive_utc()));
        }
        if let Some(end) = end {
            query = query.filter(transactions::transaction_date.le(end.naive_utc()));
        }
        if let Some(account_id) = account_id {
            query = query.filter(transactions::account_id.eq(account_id.to_string()));
        }

        query
            .order(transactions::transaction_date.asc())
            .load::<TransactionDb>(&mut conn)
            .map_err(Error::from)?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    pub fn create_transaction(&self, db_transaction: TransactionDb) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;
        diesel::insert_into(transactions::table)
            .values(&db_transaction)
            .get_result::<TransactionDb>(&mut conn)
            .map_err(Error::from)
            .and_then(Transaction::try_from)
    }

    /// Inserts both legs of an internal transfer in one database
    /// transaction; either both rows land or neither does.
    pub fn create_transfer_pair(
        &self,
        outgoing: TransactionDb,
        incoming: TransactionDb,
    ) -> Result<(Transaction, Transaction)> {
        let mut conn = get_connection(&self.pool)?;

        conn.transaction::<(Transaction, Transaction), Error, _>(|conn| {
            let out_row = diesel::insert_into(transactions::table)
                .values(&outgoing)
                .get_result::<TransactionDb>(conn)
                .map_err(Error::from)
                .and_then(Transaction::try_from)?;
            let in_row = diesel::insert_into(transactions::table)
                .values(&incoming)
                .get_result::<TransactionDb>(conn)
                .map_err(Error::from)
                .and_then(Transaction::try_from)?;
            Ok((out_row, in_row))
        })
    }

    pub fn update_transaction(
        &self,
        transaction_id: &str,
        changeset: TransactionUpdateDb,
    ) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;
        diesel::update(transactions::table.find(transaction_id))
            .set(&changeset)
            .get_result::<TransactionDb>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Transaction '{}' not found", transaction_id),
                )),
                other => Error::from(other),
            })
            .and_then(Transaction::try_from)
    }

    pub fn delete_transaction(&self, transaction_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let deleted =
            diesel::delete(transactions::table.find(transaction_id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "Transaction '{}' not found",
                transaction_id
            ))));
        }
        Ok(deleted)
    }

    /// Deletes both legs of a transfer pair atomically.
    pub fn delete_transfer_pair(&self, first_id: &str, second_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;

        conn.transaction::<usize, Error, _>(|conn| {
            let deleted = diesel::delete(
                transactions::table.filter(transactions::id.eq_any([first_id, second_id])),
            )
            .execute(conn)?;
            if deleted != 2 {
                return Err(Error::Database(DatabaseError::TransactionFailed(format!(
                    "Expected to delete 2 transfer rows, deleted {}",
                    deleted
                ))));
            }
            Ok(deleted)
        })
    }

    /// Finds the other leg of an internal transfer: same endpoints and
    /// transaction date, different row.
    pub fn find_transfer_sibling(&self, reference: &Transaction) -> Result<Option<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let reference_date: NaiveDateTime = reference.transaction_date.naive_utc();

        let mut query = transactions::table
            .filter(transactions::is_internal_transfer.eq(true))
            .filter(transactions::id.ne(reference.id.clone()))
            .filter(transactions::transaction_date.eq(reference_date))
            .into_boxed();

        query = match &reference.transfer_from_type {
            Some(t) => query.filter(transactions::transfer_from_type.eq(t.as_str().to_string())),
            None => query.filter(transactions::transfer_from_type.is_null()),
        };
        query = match &reference.transfer_from_id {
            Some(id) => query.filter(transactions::transfer_from_id.eq(id.clone())),
            None => query.filter(transactions::transfer_from_id.is_null()),
        };
        query = match &reference.transfer_to_type {
            Some(t) => query.filter(transactions::transfer_to_type.eq(t.as_str().to_string())),
            None => query.filter(transactions::transfer_to_type.is_null()),
        };
        query = match &reference.transfer_to_id {
            Some(id) => query.filter(transactions::transfer_to_id.eq(id.clone())),
            None => query.filter(transactions::transfer_to_id.is_null()),
        };

        query
            .first::<TransactionDb>(&mut conn)
            .optional()
            .map_err(Error::from)?
            .map(Transaction::try_from)
            .transpose()
    }
}

use chrono::{DateTime, Datelike, TimeZone, Utc};
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::{debug, error};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::accounts::AccountRepository;
use crate::constants::{INTERNAL_TRANSFER_CATEGORY, MONEY_DECIMAL_PRECISION, UNCATEGORIZED};
use crate::errors::{Error, Result};
use crate::sections::SectionRepository;
use crate::transactions::transactions_errors::TransactionError;
use crate::transactions::transactions_model::{
    CategorySpending, MonthlyTrend, NewTransaction, NewTransfer, SpendingSummary, Transaction,
    TransactionDb, TransactionFilters, TransactionSearchResponse, TransactionUpdate,
    TransactionUpdateDb, TransferEndpointType,
};
use crate::transactions::transactions_repository::TransactionRepository;

/// Service for transactions. Internal transfers are written and deleted as
/// atomic pairs; a lone transfer row is treated as corruption, never
/// silently repaired.
pub struct TransactionService {
    repo: TransactionRepository,
    account_repo: AccountRepository,
    section_repo: SectionRepository,
}

impl TransactionService {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self {
            repo: TransactionRepository::new(pool.clone()),
            account_repo: AccountRepository::new(pool.clone()),
            section_repo: SectionRepository::new(pool),
        }
    }

    pub fn get_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        self.repo.get_transaction(transaction_id)
    }

    pub fn search_transactions(
        &self,
        page: i64,
        page_size: i64,
        filters: &TransactionFilters,
    ) -> Result<TransactionSearchResponse> {
        self.repo.search_transactions(page, page_size, filters)
    }

    /// Records a plain transaction. Referenced account and section must
    /// exist, and the section must belong to the referenced account.
    pub fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        new_transaction.validate()?;

        if let Some(account_id) = &new_transaction.account_id {
            self.account_repo.get_account(account_id)?;
        }
        if let Some(section_id) = &new_transaction.section_id {
            let section = self.section_repo.get_section(section_id)?;
            if new_transaction.account_id.as_deref() != Some(section.account_id.as_str()) {
                return Err(TransactionError::InvalidData(
                    "Section does not belong to the given account".to_string(),
                )
                .into());
            }
        }

        let db_row = new_transaction.into_db(Uuid::new_v4().to_string(), Utc::now().naive_utc());
        self.repo.create_transaction(db_row)
    }

    /// Records an internal transfer as a -amount/+amount pair sharing the
    /// endpoint fields and date. Both rows land or neither does.
    pub fn create_internal_transfer(
        &self,
        transfer: NewTransfer,
    ) -> Result<(Transaction, Transaction)> {
        transfer.validate()?;

        if transfer.from_type == TransferEndpointType::Account {
            self.account_repo.get_account(&transfer.from_id)?;
        }
        if transfer.to_type == TransferEndpointType::Account {
            self.account_repo.get_account(&transfer.to_id)?;
        }

        let amount = transfer.amount.abs();
        let now = Utc::now().naive_utc();
        let outgoing = Self::transfer_leg(&transfer, -amount, &transfer.from_id, transfer.from_type, now);
        let incoming = Self::transfer_leg(&transfer, amount, &transfer.to_id, transfer.to_type, now);

        debug!(
            "Recording internal transfer of {} from {}:{} to {}:{}",
            amount,
            transfer.from_type.as_str(),
            transfer.from_id,
            transfer.to_type.as_str(),
            transfer.to_id
        );
        self.repo.create_transfer_pair(outgoing, incoming)
    }

    /// Bounded edit of a plain transaction. Transfer legs are immutable;
    /// delete the pair and record it again.
    pub fn update_transaction(&self, update: TransactionUpdate) -> Result<Transaction> {
        update.validate()?;
        let existing = self.repo.get_transaction(&update.id)?;
        if existing.is_internal_transfer {
            return Err(TransactionError::TransferImmutable.into());
        }
        self.repo
            .update_transaction(&update.id, TransactionUpdateDb::from(&update))
    }

    /// Deletes a transaction. For a transfer leg, the sibling is resolved
    /// and both rows are removed atomically; a missing sibling means a
    /// prior partial write and is surfaced as an integrity error.
    pub fn delete_transaction(&self, transaction_id: &str) -> Result<usize> {
        let existing = self.repo.get_transaction(transaction_id)?;

        if !existing.is_internal_transfer {
            return self.repo.delete_transaction(transaction_id);
        }

        match self.repo.find_transfer_sibling(&existing)? {
            Some(sibling) => self.repo.delete_transfer_pair(&existing.id, &sibling.id),
            None => {
                error!(
                    "Internal transfer '{}' has no sibling row; refusing to delete",
                    existing.id
                );
                Err(Error::Integrity(format!(
                    "Internal transfer '{}' is missing its paired row",
                    existing.id
                )))
            }
        }
    }

    /// Income/expense totals and per-category spending over an optional
    /// window. Internal transfers never count.
    pub fn get_spending_summary(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        account_id: Option<&str>,
    ) -> Result<SpendingSummary> {
        let rows = self.repo.list_non_transfer(start, end, account_id)?;

        let mut total_income = Decimal::ZERO;
        let mut total_expenses = Decimal::ZERO;
        let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();

        for row in &rows {
            if row.amount > Decimal::ZERO {
                total_income += row.amount;
            } else {
                let spent = row.amount.abs();
                total_expenses += spent;
                let category = row
                    .category
                    .clone()
                    .unwrap_or_else(|| UNCATEGORIZED.to_string());
                *by_category.entry(category).or_default() += spent;
            }
        }

        let mut by_category: Vec<CategorySpending> = by_category
            .into_iter()
            .map(|(category, amount)| CategorySpending {
                category,
                amount: amount.round_dp(MONEY_DECIMAL_PRECISION),
            })
            .collect();
        by_category.sort_by(|a, b| b.amount.cmp(&a.amount));

        Ok(SpendingSummary {
            net: (total_income - total_expenses).round_dp(MONEY_DECIMAL_PRECISION),
            total_income: total_income.round_dp(MONEY_DECIMAL_PRECISION),
            total_expenses: total_expenses.round_dp(MONEY_DECIMAL_PRECISION),
            by_category,
        })
    }

    /// Month-by-month income and expenses for the trailing `months` months,
    /// oldest first. Months without activity appear with zeros.
    pub fn get_monthly_trends(
        &self,
        months: u32,
        account_id: Option<&str>,
    ) -> Result<Vec<MonthlyTrend>> {
        let months = months.max(1);
        let now = Utc::now();

        let mut year = now.year();
        let mut month = now.month() as i32 - (months as i32 - 1);
        while month <= 0 {
            month += 12;
            year -= 1;
        }
        let start = Utc
            .with_ymd_and_hms(year, month as u32, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| Error::Unexpected("Could not build trend window start".to_string()))?;

        let mut buckets: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
        for _ in 0..months {
            buckets.insert(format!("{:04}-{:02}", year, month), Default::default());
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }

        for row in self.repo.list_non_transfer(Some(start), Some(now), account_id)? {
            let key = row.transaction_date.format("%Y-%m").to_string();
            if let Some((income, expenses)) = buckets.get_mut(&key) {
                if row.amount > Decimal::ZERO {
                    *income += row.amount;
                } else {
                    *expenses += row.amount.abs();
                }
            }
        }

        Ok(buckets
            .into_iter()
            .map(|(month, (income, expenses))| MonthlyTrend {
                month,
                income: income.round_dp(MONEY_DECIMAL_PRECISION),
                expenses: expenses.round_dp(MONEY_DECIMAL_PRECISION),
                net: (income - expenses).round_dp(MONEY_DECIMAL_PRECISION),
            })
            .collect())
    }

    fn transfer_leg(
        transfer: &NewTransfer,
        amount: Decimal,
        endpoint_id: &str,
        endpoint_type: TransferEndpointType,
        now: chrono::NaiveDateTime,
    ) -> TransactionDb {
        let account_id = match endpoint_type {
            TransferEndpointType::Account => Some(endpoint_id.to_string()),
            _ => None,
        };
        TransactionDb {
            id: Uuid::new_v4().to_string(),
            amount: amount.to_string(),
            description: transfer.description.trim().to_string(),
            transaction_date: transfer.transaction_date.naive_utc(),
            account_id,
            section_id: None,
            category: Some(
                transfer
                    .category
                    .clone()
                    .unwrap_or_else(|| INTERNAL_TRANSFER_CATEGORY.to_string()),
            ),
            is_internal_transfer: true,
            transfer_from_type: Some(transfer.from_type.as_str().to_string()),
            transfer_from_id: Some(transfer.from_id.clone()),
            transfer_to_type: Some(transfer.to_type.as_str().to_string()),
            transfer_to_id: Some(transfer.to_id.clone()),
            created_at: now,
            updated_at: now,
        }
    }
}

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{Error, Result, ValidationError};
use crate::transactions::transactions_errors::TransactionError;
use crate::utils::decimal_serde::decimal_serde;

/// What an internal transfer endpoint points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferEndpointType {
    Account,
    Cash,
    Equity,
    Crypto,
}

impl TransferEndpointType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferEndpointType::Account => "account",
            TransferEndpointType::Cash => "cash",
            TransferEndpointType::Equity => "equity",
            TransferEndpointType::Crypto => "crypto",
        }
    }
}

impl FromStr for TransferEndpointType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "account" => Ok(TransferEndpointType::Account),
            "cash" => Ok(TransferEndpointType::Cash),
            "equity" => Ok(TransferEndpointType::Equity),
            "crypto" => Ok(TransferEndpointType::Crypto),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown transfer endpoint type '{}'",
                other
            ))
            .into()),
        }
    }
}

/// Domain model for a money transaction. Sign encodes direction: negative
/// amounts are outflows, positive are inflows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(with = "decimal_serde")]
    pub amount: Decimal,
    pub description: String,
    pub transaction_date: DateTime<Utc>,
    pub account_id: Option<String>,
    pub section_id: Option<String>,
    pub category: Option<String>,
    pub is_internal_transfer: bool,
    pub transfer_from_type: Option<TransferEndpointType>,
    pub transfer_from_id: Option<String>,
    pub transfer_to_type: Option<TransferEndpointType>,
    pub transfer_to_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for transactions.
#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDb {
    pub id: String,
    pub amount: String,
    pub description: String,
    pub transaction_date: NaiveDateTime,
    pub account_id: Option<String>,
    pub section_id: Option<String>,
    pub category: Option<String>,
    pub is_internal_transfer: bool,
    pub transfer_from_type: Option<String>,
    pub transfer_from_id: Option<String>,
    pub transfer_to_type: Option<String>,
    pub transfer_to_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<TransactionDb> for Transaction {
    type Error = Error;

    fn try_from(db: TransactionDb) -> Result<Self> {
        Ok(Transaction {
            amount: Decimal::from_str(&db.amount)?,
            transfer_from_type: db.transfer_from_type.as_deref().map(str::parse).transpose()?,
            transfer_to_type: db.transfer_to_type.as_deref().map(str::parse).transpose()?,
            id: db.id,
            description: db.description,
            transaction_date: db.transaction_date.and_utc(),
            account_id: db.account_id,
            section_id: db.section_id,
            category: db.category,
            is_internal_transfer: db.is_internal_transfer,
            transfer_from_id: db.transfer_from_id,
            transfer_to_id: db.transfer_to_id,
            created_at: db.created_at.and_utc(),
            updated_at: db.updated_at.and_utc(),
        })
    }
}

/// Input model for a plain (non-transfer) transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(with = "decimal_serde")]
    pub amount: Decimal,
    pub description: String,
    pub transaction_date: DateTime<Utc>,
    pub account_id: Option<String>,
    pub section_id: Option<String>,
    pub category: Option<String>,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField("description".to_string()).into());
        }
        if self.amount == Decimal::ZERO {
            return Err(
                TransactionError::InvalidData("Amount cannot be zero".to_string()).into(),
            );
        }
        Ok(())
    }

    pub(crate) fn into_db(self, id: String, now: NaiveDateTime) -> TransactionDb {
        TransactionDb {
            id,
            amount: self.amount.to_string(),
            description: self.description.trim().to_string(),
            transaction_date: self.transaction_date.naive_utc(),
            account_id: self.account_id,
            section_id: self.section_id,
            category: self.category,
            is_internal_transfer: false,
            transfer_from_type: None,
            transfer_from_id: None,
            transfer_to_type: None,
            transfer_to_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input model for an internal transfer. The sign of `amount` is ignored;
/// the service normalizes it and writes a -amount/+amount pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransfer {
    #[serde(with = "decimal_serde")]
    pub amount: Decimal,
    pub description: String,
    pub transaction_date: DateTime<Utc>,
    pub from_type: TransferEndpointType,
    pub from_id: String,
    pub to_type: TransferEndpointType,
    pub to_id: String,
    /// Both legs carry this category; defaults to the internal transfer
    /// category.
    pub category: Option<String>,
}

impl NewTransfer {
    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField("description".to_string()).into());
        }
        if self.amount == Decimal::ZERO {
            return Err(TransactionError::InvalidTransfer(
                "Transfer amount cannot be zero".to_string(),
            )
            .into());
        }
        if self.from_id.trim().is_empty() {
            return Err(ValidationError::MissingField("fromId".to_string()).into());
        }
        if self.to_id.trim().is_empty() {
            return Err(ValidationError::MissingField("toId".to_string()).into());
        }
        if self.from_type == self.to_type && self.from_id == self.to_id {
            return Err(TransactionError::InvalidTransfer(
                "Source and destination must differ".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

/// Bounded update for a plain transaction. Transfer rows reject updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    pub id: String,
    #[serde(default, with = "crate::utils::decimal_serde::decimal_serde_option")]
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub transaction_date: Option<DateTime<Utc>>,
    pub category: Option<String>,
}

impl TransactionUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingField("id".to_string()).into());
        }
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err(TransactionError::InvalidData(
                    "Description cannot be empty".to_string(),
                )
                .into());
            }
        }
        if self.amount == Some(Decimal::ZERO) {
            return Err(
                TransactionError::InvalidData("Amount cannot be zero".to_string()).into(),
            );
        }
        Ok(())
    }
}

/// Changeset for transaction updates; absent fields are left untouched.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
pub struct TransactionUpdateDb {
    pub amount: Option<String>,
    pub description: Option<String>,
    pub transaction_date: Option<NaiveDateTime>,
    pub category: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl From<&TransactionUpdate> for TransactionUpdateDb {
    fn from(update: &TransactionUpdate) -> Self {
        TransactionUpdateDb {
            amount: update.amount.map(|d| d.to_string()),
            description: update.description.as_ref().map(|d| d.trim().to_string()),
            transaction_date: update.transaction_date.map(|d| d.naive_utc()),
            category: update.category.clone(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

/// Filters for transaction search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilters {
    pub account_id: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSearchResponseMeta {
    pub total_row_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSearchResponse {
    pub data: Vec<Transaction>,
    pub meta: TransactionSearchResponseMeta,
}

/// Income/expense totals with a per-category breakdown. Internal transfers
/// are excluded throughout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSummary {
    #[serde(with = "decimal_serde")]
    pub total_income: Decimal,
    #[serde(with = "decimal_serde")]
    pub total_expenses: Decimal,
    #[serde(with = "decimal_serde")]
    pub net: Decimal,
    pub by_category: Vec<CategorySpending>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpending {
    pub category: String,
    #[serde(with = "decimal_serde")]
    pub amount: Decimal,
}

/// One month of income and expenses, oldest first in the trends list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    /// "YYYY-MM"
    pub month: String,
    #[serde(with = "decimal_serde")]
    pub income: Decimal,
    #[serde(with = "decimal_serde")]
    pub expenses: Decimal,
    #[serde(with = "decimal_serde")]
    pub net: Decimal,
}

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::DEFAULT_CURRENCY;
use crate::errors::{Error, Result, ValidationError};
use crate::utils::decimal_serde::{decimal_serde, decimal_serde_option};

/// Kind of account: credit cards accrue debt, debit cards hold money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Credit,
    Debit,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Credit => "credit",
            AccountKind::Debit => "debit",
        }
    }
}

impl FromStr for AccountKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "credit" => Ok(AccountKind::Credit),
            "debit" => Ok(AccountKind::Debit),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown account kind '{}', expected 'credit' or 'debit'",
                other
            ))
            .into()),
        }
    }
}

/// Domain model for an account (credit or debit card).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub kind: AccountKind,
    pub currency: String,
    #[serde(with = "decimal_serde")]
    pub balance: Decimal,
    #[serde(with = "decimal_serde_option")]
    pub credit_limit: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Credit still available on a credit account, floored at zero.
    /// Debit accounts have none.
    pub fn available_credit(&self) -> Decimal {
        match (self.kind, self.credit_limit) {
            (AccountKind::Credit, Some(limit)) => (limit - self.balance).max(Decimal::ZERO),
            _ => Decimal::ZERO,
        }
    }
}

/// Database model for accounts. Decimal columns are stored as TEXT.
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct AccountDb {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub currency: String,
    pub balance: String,
    pub credit_limit: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<AccountDb> for Account {
    type Error = Error;

    fn try_from(db: AccountDb) -> Result<Self> {
        Ok(Account {
            kind: db.kind.parse()?,
            balance: Decimal::from_str(&db.balance)?,
            credit_limit: db
                .credit_limit
                .as_deref()
                .map(Decimal::from_str)
                .transpose()?,
            id: db.id,
            name: db.name,
            currency: db.currency,
            created_at: db.created_at.and_utc(),
            updated_at: db.updated_at.and_utc(),
        })
    }
}

/// Input model for creating a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub name: String,
    pub kind: AccountKind,
    pub currency: Option<String>,
    #[serde(default, with = "decimal_serde_option")]
    pub balance: Option<Decimal>,
    #[serde(default, with = "decimal_serde_option")]
    pub credit_limit: Option<Decimal>,
}

impl NewAccount {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        if let Some(limit) = self.credit_limit {
            if self.kind == AccountKind::Debit {
                return Err(ValidationError::InvalidInput(
                    "Debit accounts cannot carry a credit limit".to_string(),
                )
                .into());
            }
            if limit < Decimal::ZERO {
                return Err(ValidationError::InvalidInput(
                    "Credit limit cannot be negative".to_string(),
                )
                .into());
            }
        }
        Ok(())
    }

    pub(crate) fn into_db(self, id: String, now: NaiveDateTime) -> AccountDb {
        AccountDb {
            id,
            name: self.name.trim().to_string(),
            kind: self.kind.as_str().to_string(),
            currency: self.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            balance: self.balance.unwrap_or_default().to_string(),
            credit_limit: self.credit_limit.map(|d| d.to_string()),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input model for updating an account. Kind and currency are fixed at
/// creation; name, balance and credit limit may change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    pub id: String,
    pub name: String,
    #[serde(with = "decimal_serde")]
    pub balance: Decimal,
    #[serde(default, with = "decimal_serde_option")]
    pub credit_limit: Option<Decimal>,
}

impl AccountUpdate {
    pub fn validate(&self, kind: AccountKind) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingField("id".to_string()).into());
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        if let Some(limit) = self.credit_limit {
            if kind == AccountKind::Debit {
                return Err(ValidationError::InvalidInput(
                    "Debit accounts cannot carry a credit limit".to_string(),
                )
                .into());
            }
            if limit < Decimal::ZERO {
                return Err(ValidationError::InvalidInput(
                    "Credit limit cannot be negative".to_string(),
                )
                .into());
            }
        }
        Ok(())
    }
}

/// Changeset applied by the repository for account updates.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::accounts)]
#[diesel(treat_none_as_null = true)]
pub struct AccountUpdateDb {
    pub name: String,
    pub balance: String,
    pub credit_limit: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl From<&AccountUpdate> for AccountUpdateDb {
    fn from(update: &AccountUpdate) -> Self {
        AccountUpdateDb {
            name: update.name.trim().to_string(),
            balance: update.balance.to_string(),
            credit_limit: update.credit_limit.map(|d| d.to_string()),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

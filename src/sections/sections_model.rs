use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{Error, Result, ValidationError};
use crate::utils::decimal_serde::{decimal_serde, decimal_serde_option};

/// Domain model for a section (a named sub-account, e.g. an envelope or
/// savings pocket inside a debit account).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub account_id: String,
    pub name: String,
    #[serde(with = "decimal_serde")]
    pub initial_balance: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Database model for sections.
#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::sections)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SectionDb {
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub initial_balance: String,
    pub created_at: NaiveDateTime,
}

impl TryFrom<SectionDb> for Section {
    type Error = Error;

    fn try_from(db: SectionDb) -> Result<Self> {
        Ok(Section {
            initial_balance: Decimal::from_str(&db.initial_balance)?,
            id: db.id,
            account_id: db.account_id,
            name: db.name,
            created_at: db.created_at.and_utc(),
        })
    }
}

/// Input model for creating a new section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSection {
    pub account_id: String,
    pub name: String,
    #[serde(default, with = "decimal_serde_option")]
    pub initial_balance: Option<Decimal>,
}

impl NewSection {
    pub fn validate(&self) -> Result<()> {
        if self.account_id.trim().is_empty() {
            return Err(ValidationError::MissingField("accountId".to_string()).into());
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        Ok(())
    }

    pub(crate) fn into_db(self, id: String, now: NaiveDateTime) -> SectionDb {
        SectionDb {
            id,
            account_id: self.account_id,
            name: self.name.trim().to_string(),
            initial_balance: self.initial_balance.unwrap_or_default().to_string(),
            created_at: now,
        }
    }
}

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::MONEY_DECIMAL_PRECISION;
use crate::errors::{Error, Result, ValidationError};
use crate::utils::decimal_serde::decimal_serde;

/// How often a fee or interest charge is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentFrequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annually,
}

impl PaymentFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentFrequency::Daily => "daily",
            PaymentFrequency::Weekly => "weekly",
            PaymentFrequency::Monthly => "monthly",
            PaymentFrequency::Quarterly => "quarterly",
            PaymentFrequency::Annually => "annually",
        }
    }

    pub fn payments_per_year(&self) -> u32 {
        match self {
            PaymentFrequency::Daily => 365,
            PaymentFrequency::Weekly => 52,
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Quarterly => 4,
            PaymentFrequency::Annually => 1,
        }
    }
}

impl FromStr for PaymentFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "daily" => Ok(PaymentFrequency::Daily),
            "weekly" => Ok(PaymentFrequency::Weekly),
            "monthly" => Ok(PaymentFrequency::Monthly),
            "quarterly" => Ok(PaymentFrequency::Quarterly),
            "annually" => Ok(PaymentFrequency::Annually),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown payment frequency '{}'",
                other
            ))
            .into()),
        }
    }
}

/// Compounding convention for an interest rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompoundFrequency {
    Daily365,
    Daily360,
    Weekly52,
    Monthly12,
    Quarterly4,
    HalfYearly2,
    Yearly1,
}

impl CompoundFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompoundFrequency::Daily365 => "daily_365",
            CompoundFrequency::Daily360 => "daily_360",
            CompoundFrequency::Weekly52 => "weekly_52",
            CompoundFrequency::Monthly12 => "monthly_12",
            CompoundFrequency::Quarterly4 => "quarterly_4",
            CompoundFrequency::HalfYearly2 => "half_yearly_2",
            CompoundFrequency::Yearly1 => "yearly_1",
        }
    }

    pub fn periods_per_year(&self) -> u32 {
        match self {
            CompoundFrequency::Daily365 => 365,
            CompoundFrequency::Daily360 => 360,
            CompoundFrequency::Weekly52 => 52,
            CompoundFrequency::Monthly12 => 12,
            CompoundFrequency::Quarterly4 => 4,
            CompoundFrequency::HalfYearly2 => 2,
            CompoundFrequency::Yearly1 => 1,
        }
    }
}

impl FromStr for CompoundFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "daily_365" => Ok(CompoundFrequency::Daily365),
            "daily_360" => Ok(CompoundFrequency::Daily360),
            "weekly_52" => Ok(CompoundFrequency::Weekly52),
            "monthly_12" => Ok(CompoundFrequency::Monthly12),
            "quarterly_4" => Ok(CompoundFrequency::Quarterly4),
            "half_yearly_2" => Ok(CompoundFrequency::HalfYearly2),
            "yearly_1" => Ok(CompoundFrequency::Yearly1),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown compound frequency '{}'",
                other
            ))
            .into()),
        }
    }
}

/// A recurring fee or interest rate attached to an account. `rate` is a
/// nominal annual percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCharge {
    pub id: String,
    pub account_id: String,
    pub name: String,
    #[serde(with = "decimal_serde")]
    pub rate: Decimal,
    pub is_fee: bool,
    pub payment_frequency: PaymentFrequency,
    pub compound_frequency: CompoundFrequency,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl AccountCharge {
    /// Effective annual rate as a fraction: (1 + r/n)^n - 1 for nominal
    /// rate r and n compounding periods per year.
    pub fn effective_annual_rate(&self) -> Decimal {
        let n = self.compound_frequency.periods_per_year();
        let nominal = self.rate / Decimal::ONE_HUNDRED;
        let per_period = nominal / Decimal::from(n);
        (Decimal::ONE + per_period).powi(n as i64) - Decimal::ONE
    }

    /// Yearly cost of carrying `balance` under this charge.
    pub fn project_annual_cost(&self, balance: Decimal) -> Decimal {
        (balance * self.effective_annual_rate()).round_dp(MONEY_DECIMAL_PRECISION)
    }
}

/// Database model for account charges.
#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::account_charges)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountChargeDb {
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub rate: String,
    pub is_fee: bool,
    pub payment_frequency: String,
    pub compound_frequency: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl TryFrom<AccountChargeDb> for AccountCharge {
    type Error = Error;

    fn try_from(db: AccountChargeDb) -> Result<Self> {
        Ok(AccountCharge {
            rate: Decimal::from_str(&db.rate)?,
            payment_frequency: db.payment_frequency.parse()?,
            compound_frequency: db.compound_frequency.parse()?,
            id: db.id,
            account_id: db.account_id,
            name: db.name,
            is_fee: db.is_fee,
            is_active: db.is_active,
            created_at: db.created_at.and_utc(),
        })
    }
}

/// Input model for attaching a charge to an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccountCharge {
    pub account_id: String,
    pub name: String,
    #[serde(with = "decimal_serde")]
    pub rate: Decimal,
    pub is_fee: bool,
    pub payment_frequency: PaymentFrequency,
    pub compound_frequency: CompoundFrequency,
}

impl NewAccountCharge {
    pub fn validate(&self) -> Result<()> {
        if self.account_id.trim().is_empty() {
            return Err(ValidationError::MissingField("accountId".to_string()).into());
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        if self.rate < Decimal::ZERO {
            return Err(
                ValidationError::InvalidInput("Rate cannot be negative".to_string()).into(),
            );
        }
        Ok(())
    }

    pub(crate) fn into_db(self, id: String, now: NaiveDateTime) -> AccountChargeDb {
        AccountChargeDb {
            id,
            account_id: self.account_id,
            name: self.name.trim().to_string(),
            rate: self.rate.to_string(),
            is_fee: self.is_fee,
            payment_frequency: self.payment_frequency.as_str().to_string(),
            compound_frequency: self.compound_frequency.as_str().to_string(),
            is_active: true,
            created_at: now,
        }
    }
}

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::MONEY_DECIMAL_PRECISION;
use crate::errors::{Error, Result, ValidationError};
use crate::movements::movements_errors::MovementError;
use crate::utils::decimal_serde::{decimal_serde, decimal_serde_quantity};

/// Direction of a movement in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    Buy,
    Sell,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Buy => "buy",
            MovementType::Sell => "sell",
        }
    }
}

impl FromStr for MovementType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "buy" => Ok(MovementType::Buy),
            "sell" => Ok(MovementType::Sell),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown movement type '{}', expected 'buy' or 'sell'",
                other
            ))
            .into()),
        }
    }
}

/// Domain model for a buy or sell recorded against a position.
///
/// `movement_datetime` is the event time (when the trade happened);
/// `created_at` is the insertion time and breaks ordering ties.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: String,
    pub position_id: String,
    pub movement_type: MovementType,
    #[serde(with = "decimal_serde_quantity")]
    pub quantity: Decimal,
    #[serde(with = "decimal_serde")]
    pub unit_price: Decimal,
    #[serde(with = "decimal_serde")]
    pub total_amount: Decimal,
    pub movement_datetime: DateTime<Utc>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Database model for movements. Decimal columns are stored as TEXT.
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::movements)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MovementDb {
    pub id: String,
    pub position_id: String,
    pub movement_type: String,
    pub quantity: String,
    pub unit_price: String,
    pub total_amount: String,
    pub movement_datetime: NaiveDateTime,
    pub comment: Option<String>,
    pub created_at: NaiveDateTime,
}

impl TryFrom<MovementDb> for Movement {
    type Error = Error;

    fn try_from(db: MovementDb) -> Result<Self> {
        Ok(Movement {
            movement_type: db.movement_type.parse()?,
            quantity: Decimal::from_str(&db.quantity)?,
            unit_price: Decimal::from_str(&db.unit_price)?,
            total_amount: Decimal::from_str(&db.total_amount)?,
            id: db.id,
            position_id: db.position_id,
            movement_datetime: db.movement_datetime.and_utc(),
            comment: db.comment,
            created_at: db.created_at.and_utc(),
        })
    }
}

/// Input model for recording a new movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovement {
    pub position_id: String,
    pub movement_type: MovementType,
    #[serde(with = "decimal_serde_quantity")]
    pub quantity: Decimal,
    #[serde(with = "decimal_serde")]
    pub unit_price: Decimal,
    pub movement_datetime: DateTime<Utc>,
    pub comment: Option<String>,
}

impl NewMovement {
    pub fn validate(&self) -> Result<()> {
        if self.position_id.trim().is_empty() {
            return Err(ValidationError::MissingField("positionId".to_string()).into());
        }
        if self.quantity <= Decimal::ZERO {
            return Err(
                MovementError::InvalidData("Quantity must be positive".to_string()).into(),
            );
        }
        if self.unit_price <= Decimal::ZERO {
            return Err(
                MovementError::InvalidData("Unit price must be positive".to_string()).into(),
            );
        }
        Ok(())
    }

    /// Total traded amount, rounded to money precision at recording time.
    pub fn total_amount(&self) -> Decimal {
        (self.quantity * self.unit_price).round_dp(MONEY_DECIMAL_PRECISION)
    }

    pub(crate) fn into_db(self, id: String, now: NaiveDateTime) -> MovementDb {
        let total = self.total_amount();
        MovementDb {
            id,
            position_id: self.position_id,
            movement_type: self.movement_type.as_str().to_string(),
            quantity: self.quantity.to_string(),
            unit_price: self.unit_price.to_string(),
            total_amount: total.to_string(),
            movement_datetime: self.movement_datetime.naive_utc(),
            comment: self.comment,
            created_at: now,
        }
    }
}

/// Input model for editing a movement. Identity fields (position, direction)
/// are fixed; everything else may change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementUpdate {
    pub id: String,
    #[serde(default, with = "crate::utils::decimal_serde::decimal_serde_option")]
    pub quantity: Option<Decimal>,
    #[serde(default, with = "crate::utils::decimal_serde::decimal_serde_option")]
    pub unit_price: Option<Decimal>,
    pub movement_datetime: Option<DateTime<Utc>>,
    pub comment: Option<String>,
}

impl MovementUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingField("id".to_string()).into());
        }
        if let Some(quantity) = self.quantity {
            if quantity <= Decimal::ZERO {
                return Err(
                    MovementError::InvalidData("Quantity must be positive".to_string()).into(),
                );
            }
        }
        if let Some(unit_price) = self.unit_price {
            if unit_price <= Decimal::ZERO {
                return Err(
                    MovementError::InvalidData("Unit price must be positive".to_string()).into(),
                );
            }
        }
        Ok(())
    }
}

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{Error, Result, ValidationError};
use crate::holdings::PositionHoldings;
use crate::utils::decimal_serde::decimal_serde;

/// Asset class of an investment position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Equity,
    Crypto,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Equity => "equity",
            AssetClass::Crypto => "crypto",
        }
    }
}

impl FromStr for AssetClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "equity" => Ok(AssetClass::Equity),
            "crypto" => Ok(AssetClass::Crypto),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown asset class '{}', expected 'equity' or 'crypto'",
                other
            ))
            .into()),
        }
    }
}

/// Domain model for an investment position (one symbol in one asset class).
/// Quantities and cost live in the movement ledger, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub asset_class: AssetClass,
    pub symbol: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for investment positions.
#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::investment_positions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PositionDb {
    pub id: String,
    pub asset_class: String,
    pub symbol: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<PositionDb> for Position {
    type Error = Error;

    fn try_from(db: PositionDb) -> Result<Self> {
        Ok(Position {
            asset_class: db.asset_class.parse()?,
            id: db.id,
            symbol: db.symbol,
            created_at: db.created_at.and_utc(),
            updated_at: db.updated_at.and_utc(),
        })
    }
}

/// Input model for creating a position. Symbols are trimmed and upper-cased
/// before storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPosition {
    pub asset_class: AssetClass,
    pub symbol: String,
}

impl NewPosition {
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(ValidationError::MissingField("symbol".to_string()).into());
        }
        Ok(())
    }

    pub fn normalized_symbol(&self) -> String {
        self.symbol.trim().to_uppercase()
    }

    pub(crate) fn into_db(self, id: String, now: NaiveDateTime) -> PositionDb {
        let symbol = self.normalized_symbol();
        PositionDb {
            id,
            asset_class: self.asset_class.as_str().to_string(),
            symbol,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A position together with its derived holdings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSummary {
    pub position: Position,
    pub holdings: PositionHoldings,
}

/// Open positions with portfolio-level totals. Values are cost basis of the
/// open lots; no live prices are involved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub positions: Vec<PositionSummary>,
    #[serde(with = "decimal_serde")]
    pub total_invested: Decimal,
    #[serde(with = "decimal_serde")]
    pub total_realized_pnl: Decimal,
}

/// Share of the open portfolio held in one asset class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetAllocation {
    pub asset_class: AssetClass,
    #[serde(with = "decimal_serde")]
    pub value: Decimal,
    #[serde(with = "decimal_serde")]
    pub percentage: Decimal,
}

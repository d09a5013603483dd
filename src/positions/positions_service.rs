use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::constants::MONEY_DECIMAL_PRECISION;
use crate::errors::{DatabaseError, Error, Result, ValidationError};
use crate::holdings::HoldingsCalculator;
use crate::movements::MovementRepository;
use crate::positions::positions_model::{
    AssetAllocation, AssetClass, NewPosition, PortfolioSummary, Position, PositionSummary,
};
use crate::positions::positions_repository::PositionRepository;

/// Service for investment positions and portfolio roll-ups.
pub struct PositionService {
    repo: PositionRepository,
    movement_repo: MovementRepository,
}

impl PositionService {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self {
            repo: PositionRepository::new(pool.clone()),
            movement_repo: MovementRepository::new(pool),
        }
    }

    pub fn get_position(&self, position_id: &str) -> Result<Position> {
        self.repo.get_position(position_id)
    }

    pub fn list_positions(&self) -> Result<Vec<Position>> {
        self.repo.list_positions()
    }

    pub fn list_by_class(&self, asset_class: AssetClass) -> Result<Vec<Position>> {
        self.repo.list_by_class(asset_class)
    }

    /// Creates a position. One row per (asset class, symbol); a duplicate is
    /// a conflict.
    pub fn create_position(&self, new_position: NewPosition) -> Result<Position> {
        new_position.validate()?;
        let symbol = new_position.normalized_symbol();
        debug!(
            "Creating {} position {}",
            new_position.asset_class.as_str(),
            symbol
        );

        match self.repo.create_position(new_position) {
            Err(Error::Database(DatabaseError::UniqueViolation(_))) => Err(Error::Conflict(
                format!("Position for symbol '{}' already exists in this asset class", symbol),
            )),
            other => other,
        }
    }

    /// Symbol correction only; the ledger stays attached.
    pub fn update_symbol(&self, position_id: &str, symbol: &str) -> Result<Position> {
        let normalized = symbol.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(ValidationError::MissingField("symbol".to_string()).into());
        }
        match self.repo.update_symbol(position_id, &normalized) {
            Err(Error::Database(DatabaseError::UniqueViolation(_))) => Err(Error::Conflict(
                format!("Position for symbol '{}' already exists in this asset class", normalized),
            )),
            other => other,
        }
    }

    pub fn delete_position(&self, position_id: &str) -> Result<usize> {
        self.repo.delete_position_with_movements(position_id)
    }

    /// A position with its holdings derived from the full ledger.
    pub fn get_position_summary(&self, position_id: &str) -> Result<PositionSummary> {
        let position = self.repo.get_position(position_id)?;
        let ledger = self.movement_repo.list_for_position(position_id)?;
        let holdings = HoldingsCalculator::calculate(position_id, &ledger);
        Ok(PositionSummary { position, holdings })
    }

    /// All open positions with portfolio totals. Value is open-lot cost
    /// basis; closed positions still contribute realized P&L.
    pub fn get_portfolio_summary(&self) -> Result<PortfolioSummary> {
        let mut total_invested = Decimal::ZERO;
        let mut total_realized_pnl = Decimal::ZERO;
        let mut open_positions = Vec::new();

        for position in self.repo.list_positions()? {
            let ledger = self.movement_repo.list_for_position(&position.id)?;
            let holdings = HoldingsCalculator::calculate(&position.id, &ledger);

            total_realized_pnl += holdings.realized_pnl;
            if holdings.is_open() {
                total_invested += holdings.open_lots_cost();
                open_positions.push(PositionSummary { position, holdings });
            }
        }

        Ok(PortfolioSummary {
            positions: open_positions,
            total_invested: total_invested.round_dp(MONEY_DECIMAL_PRECISION),
            total_realized_pnl: total_realized_pnl.round_dp(MONEY_DECIMAL_PRECISION),
        })
    }

    /// Open-lot value and share per asset class.
    pub fn get_asset_allocation(&self) -> Result<Vec<AssetAllocation>> {
        let mut by_class: BTreeMap<&'static str, (AssetClass, Decimal)> = BTreeMap::new();
        let mut total = Decimal::ZERO;

        for position in self.repo.list_positions()? {
            let ledger = self.movement_repo.list_for_position(&position.id)?;
            let holdings = HoldingsCalculator::calculate(&position.id, &ledger);
            if !holdings.is_open() {
                continue;
            }
            let value = holdings.open_lots_cost();
            total += value;
            by_class
                .entry(position.asset_class.as_str())
                .and_modify(|(_, v)| *v += value)
                .or_insert((position.asset_class, value));
        }

        let hundred = Decimal::ONE_HUNDRED;
        Ok(by_class
            .into_values()
            .map(|(asset_class, value)| AssetAllocation {
                asset_class,
                percentage: if total > Decimal::ZERO {
                    (value / total * hundred).round_dp(MONEY_DECIMAL_PRECISION)
                } else {
                    Decimal::ZERO
                },
                value: value.round_dp(MONEY_DECIMAL_PRECISION),
            })
            .collect())
    }
}

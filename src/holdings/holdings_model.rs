use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::decimal_serde::{decimal_serde, decimal_serde_quantity};

/// An open acquisition lot: quantity still held from one buy, at the price
/// it was bought.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    #[serde(with = "decimal_serde_quantity")]
    pub remaining: Decimal,
    #[serde(with = "decimal_serde")]
    pub unit_price: Decimal,
}

impl Lot {
    /// Cost of the quantity still held in this lot.
    pub fn open_cost(&self) -> Decimal {
        self.remaining * self.unit_price
    }
}

/// Derived holdings state of a position, computed from its full movement
/// ledger. Never stored; recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionHoldings {
    pub position_id: String,
    #[serde(with = "decimal_serde_quantity")]
    pub current_quantity: Decimal,
    /// Sum of all buy totals, including fully relieved lots.
    #[serde(with = "decimal_serde")]
    pub total_cost: Decimal,
    /// Sum of all sell totals.
    #[serde(with = "decimal_serde")]
    pub total_proceeds: Decimal,
    /// Cost of the open lots divided by the open quantity; zero when flat.
    #[serde(with = "decimal_serde")]
    pub average_cost_basis: Decimal,
    /// Proceeds minus the FIFO cost of the units actually sold.
    #[serde(with = "decimal_serde")]
    pub realized_pnl: Decimal,
    pub open_lots: Vec<Lot>,
}

impl PositionHoldings {
    /// Exact cost basis of the lots still open.
    pub fn open_lots_cost(&self) -> Decimal {
        self.open_lots.iter().map(Lot::open_cost).sum()
    }

    pub fn is_open(&self) -> bool {
        self.current_quantity > Decimal::ZERO
    }
}

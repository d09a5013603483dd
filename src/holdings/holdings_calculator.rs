use rust_decimal::Decimal;

use crate::holdings::holdings_model::{Lot, PositionHoldings};
use crate::movements::movements_model::{Movement, MovementType};

/// Pure FIFO holdings calculator. No I/O: callers load the movement ledger
/// and hand it over.
pub struct HoldingsCalculator;

impl HoldingsCalculator {
    /// Replays a position's ledger in event order and derives its holdings.
    ///
    /// Buys append a lot to the FIFO queue. Sells relieve lots oldest-first;
    /// a sell larger than the open quantity drains the queue and the excess
    /// is ignored, so the open quantity never goes negative. All sums are
    /// exact; rounding happens only at serialization.
    pub fn calculate(position_id: &str, movements: &[Movement]) -> PositionHoldings {
        let ordered = Self::sorted_by_event_time(movements);

        let mut open_lots: Vec<Lot> = Vec::new();
        let mut total_cost = Decimal::ZERO;
        let mut total_proceeds = Decimal::ZERO;

        for movement in ordered {
            match movement.movement_type {
                MovementType::Buy => {
                    total_cost += movement.total_amount;
                    open_lots.push(Lot {
                        remaining: movement.quantity,
                        unit_price: movement.unit_price,
                    });
                }
                MovementType::Sell => {
                    total_proceeds += movement.total_amount;
                    Self::relieve_lots(&mut open_lots, movement.quantity);
                }
            }
        }

        let current_quantity: Decimal = open_lots.iter().map(|lot| lot.remaining).sum();
        let open_cost: Decimal = open_lots.iter().map(Lot::open_cost).sum();

        let average_cost_basis = if current_quantity > Decimal::ZERO {
            open_cost / current_quantity
        } else {
            Decimal::ZERO
        };

        // Cost of the units actually sold is everything bought minus what is
        // still open.
        let realized_pnl = total_proceeds - (total_cost - open_cost);

        PositionHoldings {
            position_id: position_id.to_string(),
            current_quantity,
            total_cost,
            total_proceeds,
            average_cost_basis,
            realized_pnl,
            open_lots,
        }
    }

    /// Checks that no sell in the ledger exceeds the quantity held at its
    /// point in event time. Returns the first offending sell, if any.
    ///
    /// This guards inserts, edits and buy deletions: callers build the
    /// would-be ledger and reject the change when a prefix goes negative.
    pub fn first_uncovered_sell(movements: &[Movement]) -> Option<Movement> {
        let ordered = Self::sorted_by_event_time(movements);

        let mut running = Decimal::ZERO;
        for movement in ordered {
            match movement.movement_type {
                MovementType::Buy => running += movement.quantity,
                MovementType::Sell => {
                    running -= movement.quantity;
                    if running < Decimal::ZERO {
                        return Some(movement);
                    }
                }
            }
        }
        None
    }

    /// Removes `quantity` from the front of the FIFO queue. Fully relieved
    /// lots are dropped; a partially relieved lot keeps its price.
    fn relieve_lots(open_lots: &mut Vec<Lot>, quantity: Decimal) {
        let mut to_relieve = quantity;
        while to_relieve > Decimal::ZERO && !open_lots.is_empty() {
            let lot = &mut open_lots[0];
            if lot.remaining > to_relieve {
                lot.remaining -= to_relieve;
                to_relieve = Decimal::ZERO;
            } else {
                to_relieve -= lot.remaining;
                open_lots.remove(0);
            }
        }
    }

    /// Event-time ascending, insertion order breaking ties.
    fn sorted_by_event_time(movements: &[Movement]) -> Vec<Movement> {
        let mut ordered = movements.to_vec();
        ordered.sort_by(|a, b| {
            a.movement_datetime
                .cmp(&b.movement_datetime)
                .then(a.created_at.cmp(&b.created_at))
        });
        ordered
    }
}

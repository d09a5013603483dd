use chrono::{DateTime, Utc};
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use crate::constants::MONEY_DECIMAL_PRECISION;
use crate::errors::{Error, Result};
use crate::holdings::HoldingsCalculator;
use crate::movements::movements_model::{Movement, MovementType, MovementUpdate, NewMovement};
use crate::movements::movements_repository::MovementRepository;
use crate::positions::PositionRepository;

/// Service for the movement ledger. Every write re-validates sell coverage
/// so the ledger never admits a sell of units that were not held at that
/// point in event time.
pub struct MovementService {
    repo: MovementRepository,
    position_repo: PositionRepository,
}

impl MovementService {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self {
            repo: MovementRepository::new(pool.clone()),
            position_repo: PositionRepository::new(pool),
        }
    }

    pub fn get_movement(&self, movement_id: &str) -> Result<Movement> {
        self.repo.get_movement(movement_id)
    }

    pub fn list_for_position(&self, position_id: &str) -> Result<Vec<Movement>> {
        self.repo.list_for_position(position_id)
    }

    pub fn list_all(&self) -> Result<Vec<Movement>> {
        self.repo.list_all()
    }

    pub fn list_by_range(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        position_id: Option<&str>,
    ) -> Result<Vec<Movement>> {
        self.repo.list_by_range(start, end, position_id)
    }

    /// Records a movement. Sells (including backdated ones) are rejected
    /// when the ledger would not hold enough units at their event time.
    pub fn create_movement(&self, new_movement: NewMovement) -> Result<Movement> {
        new_movement.validate()?;
        self.position_repo.get_position(&new_movement.position_id)?;

        if new_movement.movement_type == MovementType::Sell {
            let mut ledger = self.repo.list_for_position(&new_movement.position_id)?;
            ledger.push(Self::candidate_from(&new_movement));
            if HoldingsCalculator::first_uncovered_sell(&ledger).is_some() {
                return Err(Error::Conflict(format!(
                    "Sell of {} exceeds the quantity held at {}",
                    new_movement.quantity, new_movement.movement_datetime
                )));
            }
        }

        debug!(
            "Recording {} of {} on position {}",
            new_movement.movement_type.as_str(),
            new_movement.quantity,
            new_movement.position_id
        );
        self.repo.create_movement(new_movement)
    }

    /// Edits quantity, price, event time or comment. The total is recomputed
    /// and coverage is re-checked with the edited row substituted in.
    pub fn update_movement(&self, update: MovementUpdate) -> Result<Movement> {
        update.validate()?;
        let existing = self.repo.get_movement(&update.id)?;

        let mut edited = existing.clone();
        if let Some(quantity) = update.quantity {
            edited.quantity = quantity;
        }
        if let Some(unit_price) = update.unit_price {
            edited.unit_price = unit_price;
        }
        if let Some(movement_datetime) = update.movement_datetime {
            edited.movement_datetime = movement_datetime;
        }
        if let Some(comment) = update.comment {
            edited.comment = Some(comment);
        }
        edited.total_amount =
            (edited.quantity * edited.unit_price).round_dp(MONEY_DECIMAL_PRECISION);

        let mut ledger = self.repo.list_for_position(&existing.position_id)?;
        ledger.retain(|m| m.id != existing.id);
        ledger.push(edited.clone());
        if let Some(offender) = HoldingsCalculator::first_uncovered_sell(&ledger) {
            return Err(Error::Conflict(format!(
                "Edit would leave the sell at {} uncovered",
                offender.movement_datetime
            )));
        }

        self.repo.update_movement(&edited)
    }

    /// Deletes a movement. Removing a buy must not leave any later sell
    /// uncovered.
    pub fn delete_movement(&self, movement_id: &str) -> Result<usize> {
        let existing = self.repo.get_movement(movement_id)?;

        if existing.movement_type == MovementType::Buy {
            let mut ledger = self.repo.list_for_position(&existing.position_id)?;
            ledger.retain(|m| m.id != existing.id);
            if let Some(offender) = HoldingsCalculator::first_uncovered_sell(&ledger) {
                return Err(Error::Conflict(format!(
                    "Deleting this buy would leave the sell at {} uncovered",
                    offender.movement_datetime
                )));
            }
        }

        self.repo.delete_movement(movement_id)
    }

    fn candidate_from(new_movement: &NewMovement) -> Movement {
        Movement {
            id: String::new(),
            position_id: new_movement.position_id.clone(),
            movement_type: new_movement.movement_type,
            quantity: new_movement.quantity,
            unit_price: new_movement.unit_price,
            total_amount: new_movement.total_amount(),
            movement_datetime: new_movement.movement_datetime,
            comment: new_movement.comment.clone(),
            created_at: Utc::now(),
        }
    }
}

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::get_connection;
use crate::errors::{DatabaseError, Error, Result};
use crate::movements::movements_model::{Movement, MovementDb, NewMovement};
use crate::schema::movements;

/// Repository for the movement ledger.
pub struct MovementRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl MovementRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    pub fn get_movement(&self, movement_id: &str) -> Result<Movement> {
        let mut conn = get_connection(&self.pool)?;
        movements::table
            .find(movement_id)
            .first::<MovementDb>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Movement '{}' not found", movement_id),
                )),
                other => Error::from(other),
            })
            .and_then(Movement::try_from)
    }

    /// Ledger of one position in event-time order, insertion order breaking
    /// ties.
    pub fn list_for_position(&self, position_id: &str) -> Result<Vec<Movement>> {
        let mut conn = get_connection(&self.pool)?;
        movements::table
            .filter(movements::position_id.eq(position_id))
            .order((
                movements::movement_datetime.asc(),
                movements::created_at.asc(),
            ))
            .load::<MovementDb>(&mut conn)
            .map_err(Error::from)?
            .into_iter()
            .map(Movement::try_from)
            .collect()
    }

    pub fn list_all(&self) -> Result<Vec<Movement>> {
        let mut conn = get_connection(&self.pool)?;
        movements::table
            .order((
                movements::movement_datetime.asc(),
                movements::created_at.asc(),
            ))
            .load::<MovementDb>(&mut conn)
            .map_err(Error::from)?
            .into_iter()
            .map(Movement::try_from)
            .collect()
    }

    pub fn list_by_range(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        position_id: Option<&str>,
    ) -> Result<Vec<Movement>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = movements::table.into_boxed();

        if let Some(start) = start {
            query = query.filter(movements::movement_datetime.ge(start.naive_utc()));
        }
        if let Some(end) = end {
            query = query.filter(movements::movement_datetime.le(end.naive_utc()));
        }
        if let Some(position_id) = position_id {
            query = query.filter(movements::position_id.eq(position_id.to_string()));
        }

        query
            .order((
                movements::movement_datetime.asc(),
                movements::created_at.asc(),
            ))
            .load::<MovementDb>(&mut conn)
            .map_err(Error::from)?
            .into_iter()
            .map(Movement::try_from)
            .collect()
    }

    pub fn create_movement(&self, new_movement: NewMovement) -> Result<Movement> {
        let mut conn = get_connection(&self.pool)?;
        let db_movement = new_movement.into_db(Uuid::new_v4().to_string(), Utc::now().naive_utc());

        diesel::insert_into(movements::table)
            .values(&db_movement)
            .get_result::<MovementDb>(&mut conn)
            .map_err(Error::from)
            .and_then(Movement::try_from)
    }

    pub fn update_movement(&self, updated: &Movement) -> Result<Movement> {
        let mut conn = get_connection(&self.pool)?;

        diesel::update(movements::table.find(&updated.id))
            .set((
                movements::quantity.eq(updated.quantity.to_string()),
                movements::unit_price.eq(updated.unit_price.to_string()),
                movements::total_amount.eq(updated.total_amount.to_string()),
                movements::movement_datetime.eq(updated.movement_datetime.naive_utc()),
                movements::comment.eq(updated.comment.clone()),
            ))
            .get_result::<MovementDb>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Movement '{}' not found", updated.id),
                )),
                other => Error::from(other),
            })
            .and_then(Movement::try_from)
    }

    pub fn delete_movement(&self, movement_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let deleted = diesel::delete(movements::table.find(movement_id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "Movement '{}' not found",
                movement_id
            ))));
        }
        Ok(deleted)
    }
}

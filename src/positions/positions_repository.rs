use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::get_connection;
use crate::errors::{DatabaseError, Error, Result};
use crate::positions::positions_model::{AssetClass, NewPosition, Position, PositionDb};
use crate::schema::{investment_positions, movements};

/// Repository for investment positions.
pub struct PositionRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl PositionRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    pub fn get_position(&self, position_id: &str) -> Result<Position> {
        let mut conn = get_connection(&self.pool)?;
        investment_positions::table
            .find(position_id)
            .first::<PositionDb>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Position '{}' not found", position_id),
                )),
                other => Error::from(other),
            })
            .and_then(Position::try_from)
    }

    pub fn list_positions(&self) -> Result<Vec<Position>> {
        let mut conn = get_connection(&self.pool)?;
        investment_positions::table
            .order((
                investment_positions::asset_class.asc(),
                investment_positions::symbol.asc(),
            ))
            .load::<PositionDb>(&mut conn)
            .map_err(Error::from)?
            .into_iter()
            .map(Position::try_from)
            .collect()
    }

    pub fn list_by_class(&self, asset_class: AssetClass) -> Result<Vec<Position>> {
        let mut conn = get_connection(&self.pool)?;
        investment_positions::table
            .filter(investment_positions::asset_class.eq(asset_class.as_str()))
            .order(investment_positions::symbol.asc())
            .load::<PositionDb>(&mut conn)
            .map_err(Error::from)?
            .into_iter()
            .map(Position::try_from)
            .collect()
    }

    pub fn create_position(&self, new_position: NewPosition) -> Result<Position> {
        let mut conn = get_connection(&self.pool)?;
        let db_position = new_position.into_db(Uuid::new_v4().to_string(), Utc::now().naive_utc());

        diesel::insert_into(investment_positions::table)
            .values(&db_position)
            .get_result::<PositionDb>(&mut conn)
            .map_err(Error::from)
            .and_then(Position::try_from)
    }

    pub fn update_symbol(&self, position_id: &str, symbol: &str) -> Result<Position> {
        let mut conn = get_connection(&self.pool)?;

        diesel::update(investment_positions::table.find(position_id))
            .set((
                investment_positions::symbol.eq(symbol),
                investment_positions::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<PositionDb>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Position '{}' not found", position_id),
                )),
                other => Error::from(other),
            })
            .and_then(Position::try_from)
    }

    /// Deletes a position and its entire movement ledger atomically.
    pub fn delete_position_with_movements(&self, position_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;

        conn.transaction::<usize, Error, _>(|conn| {
            diesel::delete(movements::table.filter(movements::position_id.eq(position_id)))
                .execute(conn)?;

            let deleted =
                diesel::delete(investment_positions::table.find(position_id)).execute(conn)?;
            if deleted == 0 {
                return Err(Error::Database(DatabaseError::NotFound(format!(
                    "Position '{}' not found",
                    position_id
                ))));
            }
            Ok(deleted)
        })
    }
}

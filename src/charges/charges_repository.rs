use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::charges::charges_model::{AccountCharge, AccountChargeDb, NewAccountCharge};
use crate::db::get_connection;
use crate::errors::{DatabaseError, Error, Result};
use crate::schema::account_charges;

/// Repository for account charges.
pub struct ChargeRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl ChargeRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    pub fn get_charge(&self, charge_id: &str) -> Result<AccountCharge> {
        let mut conn = get_connection(&self.pool)?;
        account_charges::table
            .find(charge_id)
            .first::<AccountChargeDb>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Charge '{}' not found", charge_id),
                )),
                other => Error::from(other),
            })
            .and_then(AccountCharge::try_from)
    }

    pub fn list_for_account(
        &self,
        account_id: &str,
        active_only: bool,
    ) -> Result<Vec<AccountCharge>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = account_charges::table
            .filter(account_charges::account_id.eq(account_id))
            .into_boxed();
        if active_only {
            query = query.filter(account_charges::is_active.eq(true));
        }

        query
            .order(account_charges::name.asc())
            .load::<AccountChargeDb>(&mut conn)
            .map_err(Error::from)?
            .into_iter()
            .map(AccountCharge::try_from)
            .collect()
    }

    pub fn create_charge(&self, new_charge: NewAccountCharge) -> Result<AccountCharge> {
        let mut conn = get_connection(&self.pool)?;
        let db_charge = new_charge.into_db(Uuid::new_v4().to_string(), Utc::now().naive_utc());

        diesel::insert_into(account_charges::table)
            .values(&db_charge)
            .get_result::<AccountChargeDb>(&mut conn)
            .map_err(Error::from)
            .and_then(AccountCharge::try_from)
    }

    pub fn set_active(&self, charge_id: &str, active: bool) -> Result<AccountCharge> {
        let mut conn = get_connection(&self.pool)?;
        diesel::update(account_charges::table.find(charge_id))
            .set(account_charges::is_active.eq(active))
            .get_result::<AccountChargeDb>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Charge '{}' not found", charge_id),
                )),
                other => Error::from(other),
            })
            .and_then(AccountCharge::try_from)
    }

    pub fn delete_charge(&self, charge_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let deleted =
            diesel::delete(account_charges::table.find(charge_id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "Charge '{}' not found",
                charge_id
            ))));
        }
        Ok(deleted)
    }
}

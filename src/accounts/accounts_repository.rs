use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::accounts::accounts_model::{Account, AccountDb, AccountUpdate, AccountUpdateDb, NewAccount};
use crate::db::get_connection;
use crate::errors::{DatabaseError, Error, Result};
use crate::schema::accounts;

/// Repository for managing account data in the database.
pub struct AccountRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl AccountRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    pub fn get_account(&self, account_id: &str) -> Result<Account> {
        let mut conn = get_connection(&self.pool)?;
        accounts::table
            .find(account_id)
            .first::<AccountDb>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Account '{}' not found", account_id),
                )),
                other => Error::from(other),
            })
            .and_then(Account::try_from)
    }

    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        let mut conn = get_connection(&self.pool)?;
        accounts::table
            .order(accounts::name.asc())
            .load::<AccountDb>(&mut conn)
            .map_err(Error::from)?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }

    pub fn create_account(&self, new_account: NewAccount) -> Result<Account> {
        let mut conn = get_connection(&self.pool)?;
        let db_account = new_account.into_db(Uuid::new_v4().to_string(), Utc::now().naive_utc());

        diesel::insert_into(accounts::table)
            .values(&db_account)
            .get_result::<AccountDb>(&mut conn)
            .map_err(Error::from)
            .and_then(Account::try_from)
    }

    pub fn update_account(&self, update: &AccountUpdate) -> Result<Account> {
        let mut conn = get_connection(&self.pool)?;
        let changeset = AccountUpdateDb::from(update);

        diesel::update(accounts::table.find(&update.id))
            .set(&changeset)
            .get_result::<AccountDb>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Account '{}' not found", update.id),
                )),
                other => Error::from(other),
            })
            .and_then(Account::try_from)
    }

    pub fn delete_account(&self, account_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let deleted = diesel::delete(accounts::table.find(account_id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "Account '{}' not found",
                account_id
            ))));
        }
        Ok(deleted)
    }
}

use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use crate::accounts::accounts_model::{Account, AccountUpdate, NewAccount};
use crate::accounts::accounts_repository::AccountRepository;
use crate::errors::Result;

/// Service for account management.
pub struct AccountService {
    repo: AccountRepository,
}

impl AccountService {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self {
            repo: AccountRepository::new(pool),
        }
    }

    pub fn get_account(&self, account_id: &str) -> Result<Account> {
        self.repo.get_account(account_id)
    }

    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        self.repo.list_accounts()
    }

    pub fn create_account(&self, new_account: NewAccount) -> Result<Account> {
        new_account.validate()?;
        debug!("Creating {} account '{}'", new_account.kind.as_str(), new_account.name);
        self.repo.create_account(new_account)
    }

    pub fn update_account(&self, update: AccountUpdate) -> Result<Account> {
        let existing = self.repo.get_account(&update.id)?;
        update.validate(existing.kind)?;
        self.repo.update_account(&update)
    }

    /// Deletes the account. Sections and charges cascade at the database
    /// level; transaction history survives with the account link cleared.
    pub fn delete_account(&self, account_id: &str) -> Result<usize> {
        self.repo.delete_account(account_id)
    }
}

use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::accounts::AccountRepository;
use crate::charges::charges_model::{AccountCharge, NewAccountCharge};
use crate::charges::charges_repository::ChargeRepository;
use crate::errors::Result;

/// Service for fees and interest charges attached to accounts.
pub struct ChargeService {
    repo: ChargeRepository,
    account_repo: AccountRepository,
}

impl ChargeService {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self {
            repo: ChargeRepository::new(pool.clone()),
            account_repo: AccountRepository::new(pool),
        }
    }

    pub fn get_charge(&self, charge_id: &str) -> Result<AccountCharge> {
        self.repo.get_charge(charge_id)
    }

    pub fn list_for_account(
        &self,
        account_id: &str,
        active_only: bool,
    ) -> Result<Vec<AccountCharge>> {
        self.repo.list_for_account(account_id, active_only)
    }

    pub fn create_charge(&self, new_charge: NewAccountCharge) -> Result<AccountCharge> {
        new_charge.validate()?;
        self.account_repo.get_account(&new_charge.account_id)?;
        self.repo.create_charge(new_charge)
    }

    pub fn deactivate_charge(&self, charge_id: &str) -> Result<AccountCharge> {
        self.repo.set_active(charge_id, false)
    }

    pub fn delete_charge(&self, charge_id: &str) -> Result<usize> {
        self.repo.delete_charge(charge_id)
    }

    /// Projected yearly cost of all active charges on an account, at its
    /// current balance.
    pub fn project_annual_cost(&self, account_id: &str) -> Result<Decimal> {
        let account = self.account_repo.get_account(account_id)?;
        let charges = self.repo.list_for_account(account_id, true)?;
        Ok(charges
            .iter()
            .map(|charge| charge.project_annual_cost(account.balance))
            .sum())
    }
}

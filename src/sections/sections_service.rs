use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::accounts::AccountRepository;
use crate::errors::{DatabaseError, Error, Result};
use crate::sections::sections_model::{NewSection, Section};
use crate::sections::sections_repository::SectionRepository;

/// Service for managing sections inside accounts.
pub struct SectionService {
    repo: SectionRepository,
    account_repo: AccountRepository,
}

impl SectionService {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self {
            repo: SectionRepository::new(pool.clone()),
            account_repo: AccountRepository::new(pool),
        }
    }

    pub fn get_section(&self, section_id: &str) -> Result<Section> {
        self.repo.get_section(section_id)
    }

    pub fn list_sections_for_account(&self, account_id: &str) -> Result<Vec<Section>> {
        self.repo.list_sections_for_account(account_id)
    }

    /// Creates a section. Names are unique per account; a duplicate is a
    /// conflict, not a database error.
    pub fn create_section(&self, new_section: NewSection) -> Result<Section> {
        new_section.validate()?;
        self.account_repo.get_account(&new_section.account_id)?;

        match self.repo.create_section(new_section) {
            Err(Error::Database(DatabaseError::UniqueViolation(_))) => Err(Error::Conflict(
                "A section with this name already exists for the account".to_string(),
            )),
            other => other,
        }
    }

    pub fn delete_section(&self, section_id: &str) -> Result<usize> {
        self.repo.delete_section(section_id)
    }
}

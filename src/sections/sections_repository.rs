use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::get_connection;
use crate::errors::{DatabaseError, Error, Result};
use crate::schema::sections;
use crate::sections::sections_model::{NewSection, Section, SectionDb};

/// Repository for managing section data in the database.
pub struct SectionRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl SectionRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    pub fn get_section(&self, section_id: &str) -> Result<Section> {
        let mut conn = get_connection(&self.pool)?;
        sections::table
            .find(section_id)
            .first::<SectionDb>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Section '{}' not found", section_id),
                )),
                other => Error::from(other),
            })
            .and_then(Section::try_from)
    }

    pub fn list_sections_for_account(&self, account_id: &str) -> Result<Vec<Section>> {
        let mut conn = get_connection(&self.pool)?;
        sections::table
            .filter(sections::account_id.eq(account_id))
            .order(sections::name.asc())
            .load::<SectionDb>(&mut conn)
            .map_err(Error::from)?
            .into_iter()
            .map(Section::try_from)
            .collect()
    }

    pub fn create_section(&self, new_section: NewSection) -> Result<Section> {
        let mut conn = get_connection(&self.pool)?;
        let db_section = new_section.into_db(Uuid::new_v4().to_string(), Utc::now().naive_utc());

        diesel::insert_into(sections::table)
            .values(&db_section)
            .get_result::<SectionDb>(&mut conn)
            .map_err(Error::from)
            .and_then(Section::try_from)
    }

    pub fn delete_section(&self, section_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let deleted = diesel::delete(sections::table.find(section_id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "Section '{}' not found",
                section_id
            ))));
        }
        Ok(deleted)
    }
}

use std::sync::Arc;

use finanza_core::db::{self, DbPool};
use tempfile::TempDir;

/// A throwaway database for one test. The pool stays valid for as long as
/// this struct lives; the backing directory is removed on drop.
pub struct TestDb {
    pub pool: Arc<DbPool>,
    _dir: TempDir,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    // Explicit file path so a DATABASE_URL in the environment cannot leak
    // state between tests.
    let db_path = dir
        .path()
        .join("finance.db")
        .to_string_lossy()
        .to_string();

    let pool = db::create_pool(&db_path).expect("Failed to create database pool");
    db::run_migrations(&pool).expect("Failed to run migrations");

    TestDb { pool, _dir: dir }
}

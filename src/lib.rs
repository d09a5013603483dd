pub mod db;

pub mod accounts;
pub mod charges;
pub mod dashboard;
pub mod holdings;
pub mod movements;
pub mod positions;
pub mod sections;
pub mod transactions;

pub mod constants;
pub mod errors;
pub mod schema;
pub mod utils;

pub use errors::{Error, Result};

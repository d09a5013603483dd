use thiserror::Error;

/// Errors specific to the movement ledger.
#[derive(Error, Debug)]
pub enum MovementError {
    #[error("Invalid movement data: {0}")]
    InvalidData(String),
}

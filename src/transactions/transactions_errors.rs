use thiserror::Error;

/// Errors specific to transactions and internal transfers.
#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Invalid transaction data: {0}")]
    InvalidData(String),

    #[error("Invalid transfer: {0}")]
    InvalidTransfer(String),

    #[error("Internal transfers cannot be edited; delete the pair and record it again")]
    TransferImmutable,
}

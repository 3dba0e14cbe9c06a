//! Error types for escrow derivation and spending

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EscrowError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Address mismatch: expected {expected}, derived {derived}")]
    AddressMismatch { expected: String, derived: String },

    #[error("No funds available on {0}")]
    NoFundsAvailable(String),

    #[error("Insufficient funds: fee {fee} sat >= total {total} sat")]
    InsufficientFunds { total: u64, fee: u64 },

    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Rejected by network: {0}")]
    RejectedByNetwork(String),

    #[error("Script execution failed: {0}")]
    ScriptExecution(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, EscrowError>;

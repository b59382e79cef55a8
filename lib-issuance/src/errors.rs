//! Issuance Registry Errors

use lib_types::Amount;
use thiserror::Error;

/// Error during registry operations
///
/// Every variant is a rejected call with no partial state change. Errors are
/// surfaced to the immediate caller and are not retryable with the same
/// inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unauthorized: administrative origin/relay check failed")]
    Unauthorized,

    #[error("Minting is already enabled")]
    AlreadyEnabled,

    #[error("Minting is already disabled")]
    AlreadyDisabled,

    #[error("Capacity {requested} is below issued count {issued}")]
    CapacityBelowIssued { requested: u64, issued: u64 },

    #[error("Minting is disabled")]
    MintingDisabled,

    #[error("Insufficient payment: sent {sent}, required {required}")]
    InsufficientPayment { sent: Amount, required: Amount },

    #[error("Recipient already holds a token")]
    HolderLimitExceeded,

    #[error("Ledger rejected issuance: {0}")]
    LedgerRecordingFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

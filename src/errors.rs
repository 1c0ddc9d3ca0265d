//! Error types for wallet key recovery
//!
//! Only input-level failures (unreadable file, missing parameters, bad
//! arguments) ever stop a recovery run. Per-combination and per-candidate
//! failures are reported as values by the search and never escape it.

use std::time::Duration;

use primitive_types::U256;
use thiserror::Error;

/// Result alias used throughout the crate
pub type RecoveryResult<T> = Result<T, RecoveryError>;

/// Main error type for recovery operations
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("Failed to read input '{path}': {source}")]
    Input {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed {field} parameter '{value}': {reason}")]
    MalformedParameter {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Cryptographic operation failed: {0}")]
    CryptoOperation(String),

    #[error("Identity derivation failed: {0}")]
    IdentityDerivation(String),

    #[error("Missing required wallet parameters (salt, iter, iv and ct are all required)")]
    MissingParameters,

    #[error("Password unavailable: {0}")]
    Password(String),

    #[error("Invalid argument {argument}: {message}")]
    InvalidArgument { argument: String, message: String },

    #[error("Search task failed: {0}")]
    SearchTask(String),

    #[error("Transfer failed: {0}")]
    Transfer(#[from] TransferError),
}

impl RecoveryError {
    /// Create a crypto operation error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::CryptoOperation(message.into())
    }

    /// Create an identity derivation error
    pub fn identity(message: impl Into<String>) -> Self {
        Self::IdentityDerivation(message.into())
    }

    /// Create a malformed parameter error, truncating the offending value
    pub fn malformed(field: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::MalformedParameter {
            field,
            value: crate::hex_utils::truncate_for_display(value, 10),
            reason: reason.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(argument: &str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.to_string(),
            message: message.into(),
        }
    }
}

/// Errors raised by the external transfer collaborator
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Node unreachable: {0}")]
    Unreachable(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Insufficient funds: balance {balance} wei, required {required} wei")]
    InsufficientFunds { balance: U256, required: U256 },

    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Transaction not confirmed within {0:?}")]
    Timeout(Duration),

    #[error("Invalid node response: {0}")]
    InvalidResponse(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Invalid destination address: {0}")]
    InvalidDestination(String),
}

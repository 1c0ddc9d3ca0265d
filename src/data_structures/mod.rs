//! Core data types shared by extraction, search and validation

pub mod candidate_key;
pub mod decryption_attempt;
pub mod wallet_parameters;

pub use candidate_key::{CandidateKey, KeySource, TargetIdentity, ValidatedKey};
pub use decryption_attempt::DecryptionAttempt;
pub use wallet_parameters::{ParameterField, WalletParameters};

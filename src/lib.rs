//! Private key recovery from loosely structured wallet backups
//!
//! This crate recovers a single private key from a backup file by
//! extracting labeled parameters from free-form text, trying every
//! combination of them to decrypt the embedded ciphertexts, and checking
//! the keys found in each plaintext against a known target address.
//!
//! ## Pipeline
//!
//! - [`extraction`]: scans raw bytes under UTF-8, Latin-1, ASCII and UTF-16
//!   and collects `mkey`, `target_mkey`, `salt`, `iv`, `iter`, `ct` and
//!   `password` fields into [`WalletParameters`]
//! - [`recovery`]: walks the cartesian product of those parameters
//!   (PBKDF2-HMAC-SHA1, AES-256-CBC), extracts 32-byte candidates and
//!   validates them, stopping at the first exact match
//! - [`identity`]: secp256k1 + Keccak-256 Ethereum addresses
//! - [`transfer`]: moves funds from a recovered key
//! - [`output`]: console and JSON rendering of results
//!
//! ## Features
//!
//! - `http` (default): JSON-RPC transfer executor (reqwest + tokio)
//! - `cli` (default): the `recover` binary (clap, tracing-subscriber, rpassword)
//!
//! Without `http` the crate is a synchronous library with no network code.

pub mod config;
pub mod crypto;
pub mod data_structures;
pub mod errors;
pub mod extraction;
pub mod hex_utils;
pub mod identity;
pub mod output;
pub mod recovery;
pub mod transfer;

pub use config::{OutputFormat, RecoveryConfig, SearchMode};
pub use data_structures::*;
pub use errors::*;
pub use extraction::{ExtractionConfig, InputSource, ParameterExtractor, TextEncoding};
pub use identity::{EthereumIdentity, IdentityDeriver};
pub use recovery::*;
pub use transfer::{TransferPlan, TransferReceipt};

#[cfg(feature = "http")]
pub use transfer::{JsonRpcTransfer, TransferExecutor};

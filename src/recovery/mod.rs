//! Decryption search and candidate validation
//!
//! The pipeline for one combination is: decode hex parameters, derive the
//! key with PBKDF2, decrypt with AES-256-CBC, strip padding when it is
//! valid, pull candidate keys out of the plaintext (plus HD-derived keys
//! when enabled), then check each candidate's identity against the target.
//!
//! # Example
//!
//! ```no_run
//! use wallet_key_recovery::{
//!     config::RecoveryConfig,
//!     data_structures::TargetIdentity,
//!     extraction::ParameterExtractor,
//!     recovery::{AtomicCancellationToken, DecryptionEngine, RecoveryOutcome},
//! };
//!
//! let params = ParameterExtractor::default().extract(b"salt: 00\niter: 1\niv: 00\nct: 00");
//! let config = RecoveryConfig::new(TargetIdentity::new("0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"));
//! let engine = DecryptionEngine::new(&config);
//! let token = AtomicCancellationToken::new();
//! match engine.search(&params, "password", &token) {
//!     Ok(RecoveryOutcome::ExactMatch(key)) => println!("found {}", key.address),
//!     Ok(other) => println!("{}", other.kind()),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

pub mod cancellation;
pub mod candidates;
pub mod combinations;
pub mod direct;
pub mod engine;
pub mod hd_probe;
pub mod outcome;
pub mod validator;

pub use cancellation::{AtomicCancellationToken, CancellationHandle, CancellationToken};
pub use candidates::CandidateKeyExtractor;
pub use combinations::CombinationSpace;
pub use direct::{validate_direct_key, DirectKeyCheck};
pub use engine::{rank_candidates, resolve_password, DecryptionEngine};
pub use hd_probe::{HdDerivationProbe, HD_PATHS};
pub use outcome::{AttemptOutcome, RecoveryOutcome, SearchReport, SearchStats, SkipReason};
pub use validator::{KeyCandidateValidator, KeyVerdict};

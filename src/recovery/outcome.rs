//! Tagged results of single attempts and of whole searches

use std::fmt;

use serde::Serialize;

use crate::data_structures::ValidatedKey;

/// Why a combination produced nothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// salt, iv or ct was not valid hex
    MalformedHex { field: &'static str },
    /// IV decoded to the wrong number of bytes
    InvalidIvLength(usize),
    /// Ciphertext empty or not block aligned
    InvalidCiphertextLength(usize),
    /// Key derivation or decryption failed outright
    Crypto(String),
    /// The search was stopped before or during this combination
    Cancelled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MalformedHex { field } => write!(f, "malformed hex in {field}"),
            SkipReason::InvalidIvLength(len) => write!(f, "IV is {len} bytes, expected 16"),
            SkipReason::InvalidCiphertextLength(len) => {
                write!(f, "ciphertext is {len} bytes, not a non-zero multiple of 16")
            }
            SkipReason::Crypto(message) => write!(f, "crypto failure: {message}"),
            SkipReason::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Result of one decryption attempt
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    Skipped(SkipReason),
    /// A candidate whose identity equals the target
    Matched(ValidatedKey),
    /// Candidates with valid identities, none of them the target. May be empty.
    Candidates(Vec<ValidatedKey>),
}

impl AttemptOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, AttemptOutcome::Matched(_))
    }
}

/// Final answer of a recovery run
#[derive(Debug, Clone)]
pub enum RecoveryOutcome {
    NoMatch,
    ExactMatch(ValidatedKey),
    /// Ranked candidates for manual selection
    Candidates(Vec<ValidatedKey>),
}

impl RecoveryOutcome {
    /// Collapse a candidate list: empty means no match
    pub fn from_candidates(candidates: Vec<ValidatedKey>) -> Self {
        if candidates.is_empty() {
            RecoveryOutcome::NoMatch
        } else {
            RecoveryOutcome::Candidates(candidates)
        }
    }

    pub fn exact_match(&self) -> Option<&ValidatedKey> {
        match self {
            RecoveryOutcome::ExactMatch(key) => Some(key),
            _ => None,
        }
    }

    pub fn candidates(&self) -> &[ValidatedKey] {
        match self {
            RecoveryOutcome::Candidates(keys) => keys,
            _ => &[],
        }
    }

    /// Short label used by output formatters
    pub fn kind(&self) -> &'static str {
        match self {
            RecoveryOutcome::NoMatch => "no_match",
            RecoveryOutcome::ExactMatch(_) => "exact_match",
            RecoveryOutcome::Candidates(_) => "candidates",
        }
    }
}

/// Counters for one search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub combinations_total: usize,
    pub combinations_attempted: usize,
    pub combinations_skipped: usize,
    pub candidates_tested: usize,
    pub cancelled: bool,
}

/// Outcome plus counters
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub outcome: RecoveryOutcome,
    pub stats: SearchStats,
}

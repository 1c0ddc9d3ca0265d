//! Identity check of candidate keys against the target

use tracing::{debug, info, trace};

use super::{
    cancellation::CancellationToken,
    outcome::{AttemptOutcome, SkipReason},
};
use crate::{
    data_structures::{CandidateKey, TargetIdentity, ValidatedKey},
    identity::IdentityDeriver,
};

/// Verdict on a single candidate
#[derive(Debug, Clone)]
pub enum KeyVerdict {
    /// Derived identity equals the target
    Match(ValidatedKey),
    /// Valid key, different identity
    NotTarget(ValidatedKey),
    /// Not a usable scalar; skipped
    Invalid,
}

/// Derives each candidate's identity and compares it to the target
#[derive(Debug, Clone)]
pub struct KeyCandidateValidator<D> {
    deriver: D,
    target: TargetIdentity,
}

impl<D: IdentityDeriver> KeyCandidateValidator<D> {
    pub fn new(deriver: D, target: TargetIdentity) -> Self {
        Self { deriver, target }
    }

    pub fn deriver(&self) -> &D {
        &self.deriver
    }

    pub fn target(&self) -> &TargetIdentity {
        &self.target
    }

    /// Check one candidate. Derivation failures are a verdict, never an error.
    pub fn check(&self, key: CandidateKey) -> KeyVerdict {
        match self.deriver.derive_address(key.as_bytes()) {
            Ok(address) => {
                trace!(key = %key.masked(), source = %key.source(), %address, "Tested candidate");
                if self.target.matches(&address) {
                    info!(key = %key.masked(), source = %key.source(), "Candidate matches target");
                    KeyVerdict::Match(ValidatedKey::new(key, address))
                } else {
                    KeyVerdict::NotTarget(ValidatedKey::new(key, address))
                }
            }
            Err(e) => {
                trace!(key = %key.masked(), "Skipping candidate: {}", e);
                KeyVerdict::Invalid
            }
        }
    }

    /// Check candidates in order, stopping at the first match.
    ///
    /// The token is checked between candidates; a cancelled run keeps what
    /// it validated so far. `tested` is incremented per candidate checked.
    pub fn validate_all<T: CancellationToken + ?Sized>(
        &self,
        keys: Vec<CandidateKey>,
        token: &T,
        tested: &mut usize,
    ) -> AttemptOutcome {
        let mut accepted = Vec::new();
        for key in keys {
            if token.is_cancelled() {
                debug!(validated = accepted.len(), "Validation interrupted");
                if accepted.is_empty() {
                    return AttemptOutcome::Skipped(SkipReason::Cancelled);
                }
                break;
            }
            *tested += 1;
            match self.check(key) {
                KeyVerdict::Match(found) => return AttemptOutcome::Matched(found),
                KeyVerdict::NotTarget(candidate) => accepted.push(candidate),
                KeyVerdict::Invalid => {}
            }
        }
        AttemptOutcome::Candidates(accepted)
    }
}

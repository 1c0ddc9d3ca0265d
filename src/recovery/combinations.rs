//! The cartesian product of extracted parameters
//!
//! Order is row-major with the salt outermost and the master-key hint
//! innermost. Every combination has a stable index, so the sequential
//! iterator and the parallel index range walk the same sequence.

use crate::data_structures::{DecryptionAttempt, WalletParameters};

/// Random-access view over salts × iters × ivs × cts × hints
#[derive(Debug)]
pub struct CombinationSpace<'a> {
    params: &'a WalletParameters,
    hints: Vec<Option<&'a str>>,
}

impl<'a> CombinationSpace<'a> {
    /// An empty master-key pool still yields one `None` hint per combination
    pub fn new(params: &'a WalletParameters) -> Self {
        let mut hints: Vec<Option<&'a str>> = Vec::new();
        for key in params.master_keys.iter().chain(&params.target_master_keys) {
            let key = key.as_str();
            if !hints.contains(&Some(key)) {
                hints.push(Some(key));
            }
        }
        if hints.is_empty() {
            hints.push(None);
        }
        Self { params, hints }
    }

    /// Number of combinations; zero when any required field is empty
    pub fn len(&self) -> usize {
        self.params
            .salts
            .len()
            .saturating_mul(self.params.iteration_counts.len())
            .saturating_mul(self.params.ivs.len())
            .saturating_mul(self.params.ciphertexts.len())
            .saturating_mul(self.hints.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the master-key pool, at least one
    pub fn hint_count(&self) -> usize {
        self.hints.len()
    }

    /// Combination at `index` in traversal order
    pub fn get(&self, index: usize) -> Option<DecryptionAttempt<'a>> {
        if index >= self.len() {
            return None;
        }
        let p = self.params;
        let mut rest = index;

        let hint = self.hints[rest % self.hints.len()];
        rest /= self.hints.len();
        let ciphertext = &p.ciphertexts[rest % p.ciphertexts.len()];
        rest /= p.ciphertexts.len();
        let iv = &p.ivs[rest % p.ivs.len()];
        rest /= p.ivs.len();
        let iteration_count = p.iteration_counts[rest % p.iteration_counts.len()];
        rest /= p.iteration_counts.len();
        let salt = &p.salts[rest];

        Some(DecryptionAttempt {
            index,
            salt,
            iteration_count,
            iv,
            ciphertext,
            master_key_hint: hint,
        })
    }

    /// Lazy iterator in traversal order
    pub fn iter(&self) -> impl Iterator<Item = DecryptionAttempt<'a>> + '_ {
        (0..self.len()).filter_map(move |index| self.get(index))
    }
}

//! One point of the combination space

use std::fmt;

use crate::hex_utils::truncate_for_display;

/// A single (salt, iter, iv, ct, hint) tuple, borrowed from the parameter set
/// for the duration of one decryption trial.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DecryptionAttempt<'a> {
    /// Position in traversal order
    pub index: usize,
    pub salt: &'a str,
    pub iteration_count: u32,
    pub iv: &'a str,
    pub ciphertext: &'a str,
    pub master_key_hint: Option<&'a str>,
}

impl fmt::Debug for DecryptionAttempt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptionAttempt")
            .field("index", &self.index)
            .field("salt", &truncate_for_display(self.salt, 10))
            .field("iter", &self.iteration_count)
            .field("iv", &truncate_for_display(self.iv, 10))
            .field("ct", &truncate_for_display(self.ciphertext, 10))
            .field("has_hint", &self.master_key_hint.is_some())
            .finish()
    }
}

impl fmt::Display for DecryptionAttempt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} salt={} iter={} iv={} ct={}",
            self.index,
            truncate_for_display(self.salt, 10),
            self.iteration_count,
            truncate_for_display(self.iv, 10),
            truncate_for_display(self.ciphertext, 10),
        )
    }
}

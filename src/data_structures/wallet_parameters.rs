//! Parameter set extracted from a wallet backup
//!
//! Every list is insertion-ordered and duplicate free. Values are only ever
//! appended, never removed, so repeated extraction over the same input is
//! idempotent.

use std::fmt;

use zeroize::Zeroizing;

/// A labeled field recognised in backup text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterField {
    MasterKey,
    TargetMasterKey,
    Salt,
    Iv,
    IterationCount,
    Ciphertext,
    Password,
}

impl ParameterField {
    /// All fields in extraction order
    pub const ALL: [ParameterField; 7] = [
        ParameterField::MasterKey,
        ParameterField::TargetMasterKey,
        ParameterField::Salt,
        ParameterField::Iv,
        ParameterField::IterationCount,
        ParameterField::Ciphertext,
        ParameterField::Password,
    ];

    /// Short name used in log lines and error messages
    pub fn name(&self) -> &'static str {
        match self {
            ParameterField::MasterKey => "mkey_encrypted",
            ParameterField::TargetMasterKey => "target_mkey",
            ParameterField::Salt => "salt",
            ParameterField::Iv => "iv",
            ParameterField::IterationCount => "iter",
            ParameterField::Ciphertext => "ct",
            ParameterField::Password => "password",
        }
    }
}

impl fmt::Display for ParameterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wallet parameters accumulated across all text decodings of one input
#[derive(Clone, Default, PartialEq)]
pub struct WalletParameters {
    pub master_keys: Vec<String>,
    pub target_master_keys: Vec<String>,
    pub salts: Vec<String>,
    pub ivs: Vec<String>,
    pub iteration_counts: Vec<u32>,
    pub ciphertexts: Vec<String>,
    pub password: Option<Zeroizing<String>>,
}

impl WalletParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when salts, ivs, iteration counts and ciphertexts are all non-empty
    pub fn has_required_params(&self) -> bool {
        !self.salts.is_empty()
            && !self.ivs.is_empty()
            && !self.iteration_counts.is_empty()
            && !self.ciphertexts.is_empty()
    }

    /// Append a string value to the list for `field`.
    ///
    /// Returns `true` if the value was new. `IterationCount` values must go
    /// through [`add_iteration_count`](Self::add_iteration_count) and the
    /// password through [`set_password_if_absent`](Self::set_password_if_absent);
    /// passing either field here returns `false`.
    pub fn add_value(&mut self, field: ParameterField, value: &str) -> bool {
        let list = match field {
            ParameterField::MasterKey => &mut self.master_keys,
            ParameterField::TargetMasterKey => &mut self.target_master_keys,
            ParameterField::Salt => &mut self.salts,
            ParameterField::Iv => &mut self.ivs,
            ParameterField::Ciphertext => &mut self.ciphertexts,
            ParameterField::IterationCount | ParameterField::Password => return false,
        };
        push_unique(list, value.to_string())
    }

    /// Append an iteration count if not already present
    pub fn add_iteration_count(&mut self, count: u32) -> bool {
        push_unique(&mut self.iteration_counts, count)
    }

    /// Keep the first password seen; later ones are ignored
    pub fn set_password_if_absent(&mut self, password: &str) -> bool {
        if self.password.is_some() {
            return false;
        }
        self.password = Some(Zeroizing::new(password.to_string()));
        true
    }

    /// Ordered, deduplicated union of master keys and target master keys
    pub fn master_key_pool(&self) -> Vec<String> {
        let mut pool = Vec::with_capacity(self.master_keys.len() + self.target_master_keys.len());
        for key in self.master_keys.iter().chain(self.target_master_keys.iter()) {
            push_unique(&mut pool, key.clone());
        }
        pool
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, value: T) -> bool {
    if list.contains(&value) {
        return false;
    }
    list.push(value);
    true
}

impl fmt::Debug for WalletParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletParameters")
            .field("master_keys", &self.master_keys)
            .field("target_master_keys", &self.target_master_keys)
            .field("salts", &self.salts)
            .field("ivs", &self.ivs)
            .field("iteration_counts", &self.iteration_counts)
            .field("ciphertexts", &self.ciphertexts)
            .field("has_password", &self.has_password())
            .finish()
    }
}

impl fmt::Display for WalletParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WalletParameters(mkeys={}, targets={}, salts={}, ivs={}, iters={}, cts={}, has_password={})",
            self.master_keys.len(),
            self.target_master_keys.len(),
            self.salts.len(),
            self.ivs.len(),
            self.iteration_counts.len(),
            self.ciphertexts.len(),
            self.has_password()
        )
    }
}

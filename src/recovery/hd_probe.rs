//! Treat decrypted bytes as BIP-39 entropy and derive standard paths

use std::str::FromStr;

use bip32::{DerivationPath, XPrv};
use bip39::Mnemonic;
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use crate::data_structures::{CandidateKey, KeySource};

/// Bytes of entropy taken from the front of the plaintext
pub const ENTROPY_LEN: usize = 16;

/// Paths tried, in order
pub const HD_PATHS: [&str; 4] = [
    "m/44'/60'/0'/0/0", // ETH default
    "m/44'/60'/0'/0/1", // ETH second account
    "m/44'/0'/0'/0/0",  // legacy
    "m/49'/0'/0'/0/0",  // segwit
];

/// Derives one candidate key per fixed path from the first 16 plaintext bytes
#[derive(Debug, Clone)]
pub struct HdDerivationProbe {
    paths: Vec<DerivationPath>,
}

impl Default for HdDerivationProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HdDerivationProbe {
    pub fn new() -> Self {
        let paths = HD_PATHS
            .iter()
            .filter_map(|path| DerivationPath::from_str(path).ok())
            .collect();
        Self { paths }
    }

    /// Probe with custom paths; unparsable ones are dropped
    pub fn with_paths<S: AsRef<str>>(paths: &[S]) -> Self {
        let paths = paths
            .iter()
            .filter_map(|path| match DerivationPath::from_str(path.as_ref()) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    debug!("Ignoring derivation path {}: {}", path.as_ref(), e);
                    None
                }
            })
            .collect();
        Self { paths }
    }

    pub fn paths(&self) -> &[DerivationPath] {
        &self.paths
    }

    /// Keys for every path that derives; nothing for buffers under 16 bytes
    pub fn derive(&self, plaintext: &[u8]) -> Vec<CandidateKey> {
        let Some(entropy) = plaintext.get(..ENTROPY_LEN) else {
            return Vec::new();
        };
        let mnemonic = match Mnemonic::from_entropy(entropy) {
            Ok(mnemonic) => mnemonic,
            Err(e) => {
                debug!("Entropy rejected for mnemonic: {}", e);
                return Vec::new();
            }
        };
        let seed = Zeroizing::new(mnemonic.to_seed(""));

        self.paths
            .iter()
            .filter_map(|path| match XPrv::derive_from_path(&seed[..], path) {
                Ok(child) => {
                    let mut field_bytes = child.private_key().to_bytes();
                    let mut bytes = Zeroizing::new([0u8; 32]);
                    bytes.copy_from_slice(&field_bytes);
                    field_bytes.as_mut_slice().zeroize();
                    Some(CandidateKey::new(*bytes, KeySource::HdPath(path.to_string())))
                }
                Err(e) => {
                    debug!("Derivation at {} failed: {}", path, e);
                    None
                }
            })
            .collect()
    }
}

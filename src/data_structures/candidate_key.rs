//! Candidate private keys and their validated identities

use std::fmt;

use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Where a candidate key came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum KeySource {
    /// A 32-byte window of the decrypted bytes
    SlidingWindow,
    /// A 64-character hex run inside the decrypted text
    HexPattern,
    /// The master-key hint of the combination that produced the plaintext
    MasterKeyHint,
    /// A key derived from decrypted bytes used as seed entropy
    HdPath(String),
    /// Supplied by the operator, bypassing extraction
    Supplied,
}

impl KeySource {
    /// Lower ranks are presented first when offering candidates to the operator
    pub fn rank(&self) -> u8 {
        match self {
            KeySource::HexPattern => 0,
            KeySource::MasterKeyHint => 1,
            KeySource::HdPath(_) => 2,
            KeySource::SlidingWindow => 3,
            KeySource::Supplied => 4,
        }
    }
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::SlidingWindow => f.write_str("sliding-window"),
            KeySource::HexPattern => f.write_str("hex-pattern"),
            KeySource::MasterKeyHint => f.write_str("master-key-hint"),
            KeySource::HdPath(path) => write!(f, "hd-path {path}"),
            KeySource::Supplied => f.write_str("supplied"),
        }
    }
}

/// 32 raw key bytes plus provenance. Cleared on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CandidateKey {
    bytes: [u8; 32],
    #[zeroize(skip)]
    source: KeySource,
}

impl CandidateKey {
    pub fn new(bytes: [u8; 32], source: KeySource) -> Self {
        Self { bytes, source }
    }

    /// Build a candidate from a slice; `None` unless it is exactly 32 bytes
    pub fn from_slice(bytes: &[u8], source: KeySource) -> Option<Self> {
        let array: [u8; 32] = bytes.try_into().ok()?;
        Some(Self::new(array, source))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    pub fn source(&self) -> &KeySource {
        &self.source
    }

    /// Lowercase hex without prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Masked hex for log and display lines
    pub fn masked(&self) -> String {
        crate::hex_utils::mask_key(&self.to_hex())
    }
}

impl fmt::Debug for CandidateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateKey")
            .field("key", &self.masked())
            .field("source", &self.source)
            .finish()
    }
}

/// A candidate whose public identity was derived successfully
#[derive(Clone, Debug)]
pub struct ValidatedKey {
    pub key: CandidateKey,
    pub address: String,
}

impl ValidatedKey {
    pub fn new(key: CandidateKey, address: String) -> Self {
        Self { key, address }
    }
}

/// The public identity a recovery run is looking for. Compared case-insensitively.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TargetIdentity(String);

impl TargetIdentity {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, address: &str) -> bool {
        self.0.eq_ignore_ascii_case(address.trim())
    }
}

impl fmt::Display for TargetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

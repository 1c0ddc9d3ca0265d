//! Public identity derivation for candidate private keys
//!
//! The search only ever compares a derived identity string against the
//! target, so the derivation sits behind [`IdentityDeriver`] and can be
//! swapped for other chains or for test doubles.

pub mod ethereum;

pub use ethereum::{address_from_public_key, keccak256, to_checksum_address, EthereumIdentity};

use crate::errors::RecoveryResult;

/// Maps a 32-byte private key to its public identity string
pub trait IdentityDeriver: Send + Sync {
    /// Derive the identity, or fail if the key is not a valid scalar
    fn derive_address(&self, private_key: &[u8; 32]) -> RecoveryResult<String>;
}

impl<T: IdentityDeriver + ?Sized> IdentityDeriver for &T {
    fn derive_address(&self, private_key: &[u8; 32]) -> RecoveryResult<String> {
        (**self).derive_address(private_key)
    }
}

impl<T: IdentityDeriver + ?Sized> IdentityDeriver for Box<T> {
    fn derive_address(&self, private_key: &[u8; 32]) -> RecoveryResult<String> {
        (**self).derive_address(private_key)
    }
}

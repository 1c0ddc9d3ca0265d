//! Ethereum addresses from secp256k1 private keys

use secp256k1::{All, PublicKey, Secp256k1, SecretKey};
use tiny_keccak::{Hasher, Keccak};

use super::IdentityDeriver;
use crate::errors::{RecoveryError, RecoveryResult};

/// Derives EIP-55 checksummed Ethereum addresses
#[derive(Debug, Clone)]
pub struct EthereumIdentity {
    secp: Secp256k1<All>,
}

impl Default for EthereumIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl EthereumIdentity {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    /// Raw 20-byte address for a private key
    pub fn address_bytes(&self, private_key: &[u8; 32]) -> RecoveryResult<[u8; 20]> {
        let secret = SecretKey::from_slice(private_key)
            .map_err(|e| RecoveryError::identity(format!("invalid secp256k1 scalar: {e}")))?;
        let public = PublicKey::from_secret_key(&self.secp, &secret);
        Ok(address_from_public_key(&public))
    }
}

impl IdentityDeriver for EthereumIdentity {
    fn derive_address(&self, private_key: &[u8; 32]) -> RecoveryResult<String> {
        let address = self.address_bytes(private_key)?;
        Ok(to_checksum_address(&hex::encode(address)))
    }
}

/// Keccak-256 digest
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut hash = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut hash);
    hash
}

/// Last 20 bytes of the Keccak-256 hash of the uncompressed public key
pub fn address_from_public_key(public_key: &PublicKey) -> [u8; 20] {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// EIP-55 mixed-case checksum encoding of a 40-character hex address
pub fn to_checksum_address(address: &str) -> String {
    let address_lower = crate::hex_utils::clean_hex(address).to_lowercase();
    let hash = hex::encode(keccak256(address_lower.as_bytes()));

    let mut checksum_address = String::from("0x");
    for (ch, nibble) in address_lower.chars().zip(hash.chars()) {
        if ch.is_ascii_alphabetic() && nibble.to_digit(16).unwrap_or(0) >= 8 {
            checksum_address.push(ch.to_ascii_uppercase());
        } else {
            checksum_address.push(ch);
        }
    }
    checksum_address
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_from_u8(value: u8) -> [u8; 32] {
        let mut key = [0u8; 32];
        key[31] = value;
        key
    }

    #[test]
    fn test_known_addresses() {
        let identity = EthereumIdentity::new();
        assert_eq!(
            identity.derive_address(&key_from_u8(1)).unwrap(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
        assert_eq!(
            identity.derive_address(&key_from_u8(2)).unwrap(),
            "0x2B5AD5c4795c026514f8317c7a215E218DcCD6cF"
        );
    }

    #[test]
    fn test_invalid_scalars_are_rejected() {
        let identity = EthereumIdentity::new();
        assert!(identity.derive_address(&[0u8; 32]).is_err());
        // Above the curve order
        assert!(identity.derive_address(&[0xFF; 32]).is_err());
    }

    #[test]
    fn test_checksum_encoding() {
        // EIP-55 reference vectors
        for expected in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        ] {
            assert_eq!(to_checksum_address(&expected.to_lowercase()), expected);
        }
    }

    #[test]
    fn test_keccak_empty() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }
}

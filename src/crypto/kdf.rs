//! PBKDF2 key derivation

use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha1::Sha1;
use zeroize::Zeroizing;

use crate::errors::{RecoveryError, RecoveryResult};

/// Length of the derived AES-256 key
pub const DERIVED_KEY_LEN: usize = 32;

/// Derive a 32-byte key with PBKDF2-HMAC-SHA1.
///
/// `iterations` is passed through untouched, including 0 and very large
/// values; the caller owns the cost of whatever the backup specifies.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> RecoveryResult<Zeroizing<[u8; DERIVED_KEY_LEN]>> {
    let mut key = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
    pbkdf2::<Hmac<Sha1>>(password, salt, iterations, &mut key[..])
        .map_err(|e| RecoveryError::crypto(format!("PBKDF2 failed: {e}")))?;
    Ok(key)
}

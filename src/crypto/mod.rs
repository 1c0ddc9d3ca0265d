//! Symmetric primitives used by the decryption search
//!
//! PBKDF2-HMAC-SHA1 stretches the password, AES-256-CBC decrypts, and a
//! lenient PKCS#7 step trims padding when it is well formed.

pub mod cbc;
pub mod kdf;
pub mod padding;

pub use cbc::{decrypt_cbc, encrypt_cbc_pkcs7, BLOCK_SIZE};
pub use kdf::{derive_key, DERIVED_KEY_LEN};
pub use padding::{pkcs7_pad, unpad_lenient, unpadded_len};

use zeroize::Zeroizing;

use crate::errors::RecoveryResult;

/// Derive the key, decrypt and leniently unpad in one step.
///
/// The derived key lives in a zeroizing buffer and is cleared on every
/// return path.
pub fn decrypt_with_password(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    iv: &[u8],
    ciphertext: &[u8],
) -> RecoveryResult<Zeroizing<Vec<u8>>> {
    let key = derive_key(password, salt, iterations)?;
    let mut plaintext = decrypt_cbc(&key, iv, ciphertext)?;
    let len = unpadded_len(&plaintext);
    plaintext.truncate(len);
    Ok(plaintext)
}

/// Inverse of [`decrypt_with_password`]: derive the key and encrypt with PKCS#7 padding
pub fn encrypt_with_password(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    iv: &[u8],
    plaintext: &[u8],
) -> RecoveryResult<Vec<u8>> {
    let key = derive_key(password, salt, iterations)?;
    encrypt_cbc_pkcs7(&key, iv, plaintext)
}

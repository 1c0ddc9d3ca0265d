//! AES-256-CBC without padding handling
//!
//! Chaining is done block by block over the raw AES primitive. Padding is a
//! separate, lenient step (see [`super::padding`]) because recovered
//! plaintext is not guaranteed to be padded at all.

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes256Dec, Aes256Enc, Block};
use zeroize::Zeroizing;

use crate::errors::{RecoveryError, RecoveryResult};

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// XOR two 16-byte blocks into `output`
#[inline(always)]
fn xor_blocks(block_a: &[u8], block_b: &[u8], output: &mut [u8]) {
    for ((out, a), b) in output.iter_mut().zip(block_a).zip(block_b).take(BLOCK_SIZE) {
        *out = a ^ b;
    }
}

fn check_iv(iv: &[u8]) -> RecoveryResult<()> {
    if iv.len() != BLOCK_SIZE {
        return Err(RecoveryError::crypto(format!(
            "IV must be {BLOCK_SIZE} bytes, got {}",
            iv.len()
        )));
    }
    Ok(())
}

/// Decrypt `ciphertext` in CBC mode. Returns the raw plaintext, padding included.
pub fn decrypt_cbc(
    key: &[u8; 32],
    iv: &[u8],
    ciphertext: &[u8],
) -> RecoveryResult<Zeroizing<Vec<u8>>> {
    check_iv(iv)?;
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(RecoveryError::crypto(format!(
            "ciphertext length {} is not a non-zero multiple of {BLOCK_SIZE}",
            ciphertext.len()
        )));
    }

    let cipher = Aes256Dec::new_from_slice(key)
        .map_err(|e| RecoveryError::crypto(format!("invalid AES key: {e}")))?;

    let mut plaintext = Zeroizing::new(vec![0u8; ciphertext.len()]);
    let mut previous = iv;
    for (chunk, out) in ciphertext
        .chunks_exact(BLOCK_SIZE)
        .zip(plaintext.chunks_exact_mut(BLOCK_SIZE))
    {
        let mut block = Block::clone_from_slice(chunk);
        cipher.decrypt_block(&mut block);
        xor_blocks(block.as_slice(), previous, out);
        previous = chunk;
    }
    Ok(plaintext)
}

/// Encrypt `plaintext` in CBC mode with PKCS#7 padding.
///
/// Used to build backups whose decryption is known in advance.
pub fn encrypt_cbc_pkcs7(key: &[u8; 32], iv: &[u8], plaintext: &[u8]) -> RecoveryResult<Vec<u8>> {
    check_iv(iv)?;
    let cipher = Aes256Enc::new_from_slice(key)
        .map_err(|e| RecoveryError::crypto(format!("invalid AES key: {e}")))?;

    let padded = Zeroizing::new(super::padding::pkcs7_pad(plaintext, BLOCK_SIZE));
    let mut ciphertext = Vec::with_capacity(padded.len());
    let mut previous = [0u8; BLOCK_SIZE];
    previous.copy_from_slice(iv);

    for chunk in padded.chunks_exact(BLOCK_SIZE) {
        let mut mixed = [0u8; BLOCK_SIZE];
        xor_blocks(chunk, &previous, &mut mixed);
        let mut block = Block::from(mixed);
        cipher.encrypt_block(&mut block);
        previous.copy_from_slice(block.as_slice());
        ciphertext.extend_from_slice(block.as_slice());
    }
    Ok(ciphertext)
}

//! Shared fixtures for integration tests

#![allow(dead_code)]

use wallet_key_recovery::crypto::encrypt_with_password;

/// Address of private key 0x...01
pub const ADDRESS_OF_ONE: &str = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";
/// Address of private key 0x...02
pub const ADDRESS_OF_TWO: &str = "0x2B5AD5c4795c026514f8317c7a215E218DcCD6cF";
/// m/44'/60'/0'/0/0 for the all-zero 16-byte entropy mnemonic
pub const ZERO_ENTROPY_ETH_ADDRESS: &str = "0x9858EfFD232B4033E47d90003D41EC34EcaEda94";

pub const SALT_HEX: &str = "a1b2c3d4e5f60718";
pub const IV_HEX: &str = "000102030405060708090a0b0c0d0e0f";
pub const ITERATIONS: u32 = 25;

pub fn key_from_u8(value: u8) -> [u8; 32] {
    let mut key = [0u8; 32];
    key[31] = value;
    key
}

/// Ciphertext hex for `plaintext` under the fixture salt, IV and iteration count
pub fn encrypt_hex(plaintext: &[u8], password: &str) -> String {
    let salt = hex::decode(SALT_HEX).unwrap();
    let iv = hex::decode(IV_HEX).unwrap();
    hex::encode(encrypt_with_password(password.as_bytes(), &salt, ITERATIONS, &iv, plaintext).unwrap())
}

/// A backup in the labeled-field text format wrapping `plaintext`
pub fn backup_text(plaintext: &[u8], password: &str, include_password: bool) -> String {
    let mut text = format!(
        "wallet export\nsalt: {SALT_HEX}\niter: {ITERATIONS}\niv: {IV_HEX}\nct: {}\n",
        encrypt_hex(plaintext, password)
    );
    if include_password {
        text.push_str(&format!("password: {password}\n"));
    }
    text
}

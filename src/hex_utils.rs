//! Hex helpers shared by the extractor, the engine and the CLI

use crate::errors::{RecoveryError, RecoveryResult};

/// Strip a single leading `0x` prefix, if present
pub fn clean_hex(value: &str) -> &str {
    value.strip_prefix("0x").unwrap_or(value)
}

/// Decode a hex-encoded wallet parameter, tolerating an optional `0x` prefix
pub fn decode_hex_param(field: &'static str, value: &str) -> RecoveryResult<Vec<u8>> {
    hex::decode(clean_hex(value)).map_err(|e| RecoveryError::malformed(field, value, e.to_string()))
}

/// Parse a 32-byte private key from hex (optional `0x` prefix)
pub fn parse_private_key_hex(value: &str) -> RecoveryResult<[u8; 32]> {
    let trimmed = clean_hex(value.trim());
    let mut key = [0u8; 32];
    hex::decode_to_slice(trimmed, &mut key).map_err(|_| {
        RecoveryError::invalid_argument(
            "private_key",
            "expected 64 hex characters (32 bytes), optionally prefixed with 0x",
        )
    })?;
    Ok(key)
}

/// Mask a secret hex string for display as `abcdef...1234`
pub fn mask_key(key_hex: &str) -> String {
    if key_hex.len() <= 10 {
        return "*".repeat(key_hex.len());
    }
    format!("{}...{}", &key_hex[..6], &key_hex[key_hex.len() - 4..])
}

/// Truncate a value for log lines, appending `...` when cut
pub fn truncate_for_display(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &value[..idx]),
        None => value.to_string(),
    }
}

//! Private-key candidates from decrypted plaintext

use tracing::{trace, warn};
use zeroize::Zeroizing;

use crate::{
    data_structures::{CandidateKey, KeySource},
    extraction::{decode_utf8_ignore, HEX_KEY_PATTERN},
    hex_utils::clean_hex,
};

/// Width of a raw private key
pub const KEY_LEN: usize = 32;

/// Produces deduplicated 32-byte candidates from one plaintext buffer.
///
/// Three sources are combined in discovery order: every overlapping
/// 32-byte window, every 64-character hex run in the lossy UTF-8 text, and
/// the master-key hint when it is itself 64 hex characters.
#[derive(Debug, Clone, Default)]
pub struct CandidateKeyExtractor;

impl CandidateKeyExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, plaintext: &[u8], master_key_hint: Option<&str>) -> Vec<CandidateKey> {
        let mut keys = sliding_windows(plaintext);
        keys.extend(hex_runs(plaintext));
        if let Some(key) = master_key_hint.and_then(hint_key) {
            keys.push(key);
        }
        trace!(count = keys.len(), "Raw candidates before dedupe");
        dedupe_by_value(keys)
    }
}

/// `len - 31` overlapping windows for buffers of at least 32 bytes
pub fn sliding_windows(plaintext: &[u8]) -> Vec<CandidateKey> {
    plaintext
        .windows(KEY_LEN)
        .filter_map(|window| CandidateKey::from_slice(window, KeySource::SlidingWindow))
        .collect()
}

/// Every `\b[a-fA-F0-9]{64}\b` run in the lossy UTF-8 decoding
pub fn hex_runs(plaintext: &[u8]) -> Vec<CandidateKey> {
    let pattern = match HEX_KEY_PATTERN.as_ref() {
        Ok(pattern) => pattern,
        Err(e) => {
            warn!("Hex key pattern unavailable: {}", e);
            return Vec::new();
        }
    };

    let text = Zeroizing::new(decode_utf8_ignore(plaintext));
    pattern
        .captures_iter(&text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| {
            let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
            hex::decode_to_slice(m.as_str(), &mut bytes[..]).ok()?;
            Some(CandidateKey::new(*bytes, KeySource::HexPattern))
        })
        .collect()
}

/// The hint as a key, only when it is exactly 64 hex characters after `0x`
pub fn hint_key(hint: &str) -> Option<CandidateKey> {
    let cleaned = clean_hex(hint);
    if cleaned.len() != KEY_LEN * 2 {
        return None;
    }
    let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
    hex::decode_to_slice(cleaned, &mut bytes[..]).ok()?;
    Some(CandidateKey::new(*bytes, KeySource::MasterKeyHint))
}

/// Keep the first occurrence of each key value, preserving order
pub fn dedupe_by_value(keys: Vec<CandidateKey>) -> Vec<CandidateKey> {
    dedupe_by_key_bytes(keys, CandidateKey::as_bytes)
}

/// First-occurrence dedupe over anything carrying key bytes.
///
/// Sorts indices rather than keys so no extra copies of key material are made.
pub fn dedupe_by_key_bytes<T, F>(items: Vec<T>, bytes: F) -> Vec<T>
where
    F: Fn(&T) -> &[u8; KEY_LEN],
{
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| bytes(&items[a]).cmp(bytes(&items[b])).then(a.cmp(&b)));

    let mut keep = vec![true; items.len()];
    for pair in order.windows(2) {
        if bytes(&items[pair[0]]) == bytes(&items[pair[1]]) {
            keep[pair[1]] = false;
        }
    }

    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, keep)| keep.then_some(item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_counts() {
        let extractor = CandidateKeyExtractor::new();
        let exact: Vec<u8> = (0..32).collect();
        assert_eq!(extractor.extract(&exact, None).len(), 1);

        let forty: Vec<u8> = (0..40).collect();
        let keys = extractor.extract(&forty, None);
        assert_eq!(keys.len(), 9);
        assert_eq!(keys[8].as_bytes()[0], 8);

        assert!(extractor.extract(&[0u8; 31], None).is_empty());
    }

    #[test]
    fn test_windows_are_deduplicated() {
        // 40 identical bytes give 9 equal windows
        let keys = CandidateKeyExtractor::new().extract(&[0x11; 40], None);
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn test_hex_run_is_found() {
        let hex_key = "ab".repeat(32);
        let text = format!("key = {hex_key}\n");
        let keys = hex_runs(text.as_bytes());
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].as_bytes(), &[0xab; 32]);
        assert_eq!(keys[0].source(), &KeySource::HexPattern);

        // 65 hex chars has no word boundary at 64
        let too_long = format!("{hex_key}a");
        assert!(hex_runs(too_long.as_bytes()).is_empty());
    }

    #[test]
    fn test_hint_requires_64_hex_chars() {
        let hint = format!("0x{}", "01".repeat(32));
        assert_eq!(hint_key(&hint).unwrap().source(), &KeySource::MasterKeyHint);
        assert!(hint_key("01".repeat(31).as_str()).is_none());
        // Base64 characters that are not hex
        assert!(hint_key(&"zz".repeat(32)).is_none());
    }

    #[test]
    fn test_first_occurrence_wins() {
        let hex_key = "cd".repeat(32);
        let keys = CandidateKeyExtractor::new().extract(b"short", Some(hex_key.as_str()));
        assert_eq!(keys.len(), 1);

        // Same value found as hex text and as hint
        let keys = CandidateKeyExtractor::new().extract(hex_key.as_bytes(), Some(hex_key.as_str()));
        let hex_hits: Vec<_> = keys
            .iter()
            .filter(|k| k.as_bytes() == &[0xcd; 32])
            .collect();
        assert_eq!(hex_hits.len(), 1);
        assert_eq!(hex_hits[0].source(), &KeySource::HexPattern);
    }
}

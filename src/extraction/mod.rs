//! Wallet parameter extraction from loosely structured backups
//!
//! This module scans raw backup bytes under several text decodings and
//! collects every labeled field it recognises (master keys, salts, IVs,
//! iteration counts, ciphertexts and an optional password) into a single
//! [`WalletParameters`] value. Extraction is best effort: a decoding or a
//! pattern that cannot be used is logged and skipped, the rest still runs.

pub mod decoding;
pub mod patterns;
pub mod source;

pub use decoding::{decode_utf8_ignore, TextEncoding};
pub use patterns::{pattern_source, FIELD_PATTERNS, HEX_KEY_PATTERN};
pub use source::InputSource;

use tracing::{debug, info, warn};

use crate::{
    data_structures::{ParameterField, WalletParameters},
    errors::RecoveryResult,
    hex_utils::truncate_for_display,
};

/// Configuration for parameter extraction
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Decodings applied to the raw bytes, in order
    pub encodings: Vec<TextEncoding>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            encodings: TextEncoding::ALL.to_vec(),
        }
    }
}

impl ExtractionConfig {
    /// Restrict extraction to the given decodings
    pub fn with_encodings(encodings: Vec<TextEncoding>) -> Self {
        Self { encodings }
    }
}

/// Builds [`WalletParameters`] from raw backup bytes
#[derive(Debug, Clone, Default)]
pub struct ParameterExtractor {
    config: ExtractionConfig,
}

impl ParameterExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Read `source` and extract its parameters.
    ///
    /// Only an unreadable source is an error; text that contains no
    /// recognisable fields yields empty parameters.
    pub fn extract_from_source(&self, source: &InputSource) -> RecoveryResult<WalletParameters> {
        let raw = source.read_all()?;
        info!(
            "Extracting parameters from {} ({} bytes)",
            source.describe(),
            raw.len()
        );
        Ok(self.extract(&raw))
    }

    /// Extract parameters from raw bytes, accumulating across every decoding
    pub fn extract(&self, raw: &[u8]) -> WalletParameters {
        let mut params = WalletParameters::new();
        for encoding in &self.config.encodings {
            let text = encoding.decode(raw);
            debug!("Decoded {} bytes as {} ({} chars)", raw.len(), encoding, text.chars().count());
            self.extract_text(&text, &mut params);
        }
        params
    }

    /// Apply every field pattern to one decoded text
    pub fn extract_text(&self, text: &str, params: &mut WalletParameters) {
        for (field, pattern) in FIELD_PATTERNS.iter() {
            let regex = match pattern {
                Ok(regex) => regex,
                Err(e) => {
                    warn!("Skipping field {}: pattern unavailable: {}", field, e);
                    continue;
                }
            };

            for captures in regex.captures_iter(text) {
                let Some(value) = captures.get(1).map(|m| m.as_str()) else {
                    continue;
                };
                record_match(*field, value, params);
            }
        }
    }
}

fn record_match(field: ParameterField, value: &str, params: &mut WalletParameters) {
    match field {
        ParameterField::Password => {
            if params.set_password_if_absent(value) {
                info!("Found password");
            }
        }
        ParameterField::IterationCount => match value.parse::<u32>() {
            Ok(count) => {
                if params.add_iteration_count(count) {
                    info!("Found {}: {}", field, count);
                }
            }
            Err(e) => warn!("Discarding {} value '{}' (not a 32-bit count): {}", field, value, e),
        },
        _ => {
            if params.add_value(field, value) {
                info!("Found {}: {}", field, truncate_for_display(value, 10));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_reference_example() {
        let input = b"salt: aa\niter: 1000\niv: bb\nct: cc\npassword: hunter2";
        let params = ParameterExtractor::default().extract(input);

        assert_eq!(params.salts, vec!["aa"]);
        assert_eq!(params.iteration_counts, vec![1000]);
        assert_eq!(params.ivs, vec!["bb"]);
        assert_eq!(params.ciphertexts, vec!["cc"]);
        assert_eq!(params.password.as_deref().map(String::as_str), Some("hunter2"));
        assert!(params.has_required_params());
    }

    #[test]
    fn test_values_accumulate_across_decodings_without_duplicates() {
        // The same text decodes identically as UTF-8, Latin-1 and ASCII
        let params = ParameterExtractor::default().extract(b"salt: aa\nsalt: bb\nsalt: aa");
        assert_eq!(params.salts, vec!["aa", "bb"]);
    }

    #[test]
    fn test_utf16_only_input_is_found() {
        let text = "iv: 00ff\niter: 7";
        let mut raw = vec![0xFF, 0xFE];
        raw.extend(text.encode_utf16().flat_map(u16::to_le_bytes));

        let params = ParameterExtractor::default().extract(&raw);
        assert_eq!(params.ivs, vec!["00ff"]);
        assert_eq!(params.iteration_counts, vec![7]);
    }

    #[test]
    fn test_oversized_iteration_count_is_discarded() {
        let params = ParameterExtractor::default().extract(b"iter: 99999999999999\niter: 5");
        assert_eq!(params.iteration_counts, vec![5]);
    }

    #[test]
    fn test_only_oversized_iteration_count_leaves_params_incomplete() {
        let params = ParameterExtractor::default()
            .extract(b"salt: aa\niter: 4294967296\niv: bb\nct: cc");
        assert!(params.iteration_counts.is_empty());
        assert!(!params.has_required_params());
    }

    #[test]
    fn test_restricted_encodings() {
        let config = ExtractionConfig::with_encodings(vec![TextEncoding::Ascii]);
        let text = "ct: abcd";
        let utf16: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();

        // ASCII decoding of UTF-16 bytes keeps the NULs, so no label matches
        let params = ParameterExtractor::new(config).extract(&utf16);
        assert!(params.ciphertexts.is_empty());
    }
}

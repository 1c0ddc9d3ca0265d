//! Labeled field patterns recognised in backup text
//!
//! The patterns are the input format: they are deliberately loose (no
//! checksum, no structure) and must keep matching exactly this text.

use lazy_static::lazy_static;
use regex::Regex;

use crate::data_structures::ParameterField;

/// Base64-alphabet token shared by every non-numeric field
const TOKEN: &str = r"([A-Za-z0-9+/=]+)";

lazy_static! {
    /// One compiled pattern per field, in extraction order. A pattern that
    /// fails to compile is kept as an error so only its field is skipped.
    pub static ref FIELD_PATTERNS: Vec<(ParameterField, Result<Regex, regex::Error>)> =
        ParameterField::ALL
            .iter()
            .map(|field| (*field, Regex::new(&pattern_source(*field))))
            .collect();

    /// 64 hex characters on word boundaries
    pub static ref HEX_KEY_PATTERN: Result<Regex, regex::Error> =
        Regex::new(r"\b([a-fA-F0-9]{64})\b");
}

/// Regex source for a field, case-insensitive, value in capture group 1
pub fn pattern_source(field: ParameterField) -> String {
    match field {
        ParameterField::MasterKey => format!(r"(?i)(?:mkey_encrypted|mkey|master key):\s*{TOKEN}"),
        ParameterField::TargetMasterKey => format!(r"(?i)(?:target_mkey|target):\s*{TOKEN}"),
        ParameterField::Salt => format!(r"(?i)salt:\s*{TOKEN}"),
        ParameterField::Iv => format!(r"(?i)iv:\s*{TOKEN}"),
        ParameterField::IterationCount => r"(?i)iter:\s*(\d+)".to_string(),
        ParameterField::Ciphertext => format!(r"(?i)ct:\s*{TOKEN}"),
        ParameterField::Password => r"(?i)(?:password|pass):\s*(.+?)(?:\n|$)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captures(field: ParameterField, text: &str) -> Vec<String> {
        let regex = Regex::new(&pattern_source(field)).unwrap();
        regex
            .captures_iter(text)
            .map(|c| c[1].to_string())
            .collect()
    }

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(FIELD_PATTERNS.len(), ParameterField::ALL.len());
        assert!(FIELD_PATTERNS.iter().all(|(_, regex)| regex.is_ok()));
        assert!(HEX_KEY_PATTERN.is_ok());
    }

    #[test]
    fn test_master_key_labels() {
        let text = "mkey_encrypted: AAA=\nMKEY: bbb\nMaster Key:ccc+/";
        assert_eq!(
            captures(ParameterField::MasterKey, text),
            vec!["AAA=", "bbb", "ccc+/"]
        );
    }

    #[test]
    fn test_target_labels() {
        let text = "target_mkey: 0xabc\nTARGET:def";
        assert_eq!(
            captures(ParameterField::TargetMasterKey, text),
            vec!["0xabc", "def"]
        );
    }

    #[test]
    fn test_token_stops_at_non_base64_character() {
        assert_eq!(captures(ParameterField::Salt, "salt: ab-cd"), vec!["ab"]);
        assert_eq!(captures(ParameterField::Ciphertext, "ct:  ff00 11"), vec!["ff00"]);
    }

    #[test]
    fn test_iteration_digits_only() {
        assert_eq!(
            captures(ParameterField::IterationCount, "iter: 2048\nITER:abc"),
            vec!["2048"]
        );
    }

    #[test]
    fn test_password_is_rest_of_line() {
        assert_eq!(
            captures(ParameterField::Password, "password: correct horse\nnext"),
            vec!["correct horse"]
        );
        assert_eq!(captures(ParameterField::Password, "pass:x y z"), vec!["x y z"]);
    }

    #[test]
    fn test_loose_labels_match_inside_words() {
        // "priv:" ends in "iv:", which the format accepts as an iv label
        assert_eq!(captures(ParameterField::Iv, "priv: 0011"), vec!["0011"]);
    }
}

//! Output formatting for recovery results
//!
//! Console output (summary or detailed) for operators and JSON for
//! programmatic callers. Keys are masked unless `show_keys` is set.

use std::io::{self, Write};

use serde_json::{json, Value};

use crate::{
    config::OutputFormat,
    data_structures::{ValidatedKey, WalletParameters},
    recovery::{DirectKeyCheck, RecoveryOutcome, SearchReport},
    transfer::{format_ether, TransferReceipt},
};

/// Configuration for output formatting
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Print full private keys instead of `abcdef...1234`
    pub show_keys: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Summary,
            show_keys: false,
        }
    }
}

impl OutputConfig {
    pub fn key_text(&self, key: &ValidatedKey) -> String {
        if self.show_keys {
            format!("0x{}", key.key.to_hex())
        } else {
            key.key.masked()
        }
    }
}

/// Output formatter trait for the different display formats
pub trait OutputFormatter: Send + Sync {
    /// Parameters found in the backup
    fn display_parameters(&self, params: &WalletParameters, config: &OutputConfig) -> io::Result<()>;

    /// Final search result
    fn display_report(&self, report: &SearchReport, config: &OutputConfig) -> io::Result<()>;

    /// Result of checking a supplied key
    fn display_direct_key(&self, check: &DirectKeyCheck, config: &OutputConfig) -> io::Result<()>;

    /// Confirmed transfer
    fn display_transfer(&self, receipt: &TransferReceipt, config: &OutputConfig) -> io::Result<()>;

    fn display_error(&self, error: &str, config: &OutputConfig) -> io::Result<()>;

    fn flush(&self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// Console output for summary and detailed modes
#[derive(Debug, Default)]
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Numbered candidate lines, as offered for selection
    pub fn candidate_lines(candidates: &[ValidatedKey], config: &OutputConfig) -> Vec<String> {
        candidates
            .iter()
            .enumerate()
            .map(|(i, candidate)| {
                let base = format!(
                    "{}. {} → {}",
                    i + 1,
                    config.key_text(candidate),
                    candidate.address
                );
                match config.format {
                    OutputFormat::Detailed => format!("{base} ({})", candidate.key.source()),
                    _ => base,
                }
            })
            .collect()
    }

    pub fn render_report(report: &SearchReport, config: &OutputConfig) -> String {
        let mut lines = Vec::new();
        let stats = &report.stats;

        if config.format == OutputFormat::Detailed {
            lines.push(format!(
                "📊 Combinations: {} total, {} attempted, {} skipped",
                stats.combinations_total, stats.combinations_attempted, stats.combinations_skipped
            ));
            lines.push(format!("🔍 Candidates tested: {}", stats.candidates_tested));
        }
        if stats.cancelled {
            lines.push("🛑 Search interrupted, results are partial".to_string());
        }

        match &report.outcome {
            RecoveryOutcome::ExactMatch(key) => {
                lines.push(format!(
                    "✅ Found matching key: {} → {} ({})",
                    config.key_text(key),
                    key.address,
                    key.key.source()
                ));
            }
            RecoveryOutcome::Candidates(candidates) => {
                lines.push(format!("Found {} potential keys", candidates.len()));
                lines.extend(Self::candidate_lines(candidates, config));
            }
            RecoveryOutcome::NoMatch => lines.push("No keys found".to_string()),
        }
        lines.join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn display_parameters(&self, params: &WalletParameters, _config: &OutputConfig) -> io::Result<()> {
        println!("\nFound wallet parameters:");
        println!("{params}");
        Ok(())
    }

    fn display_report(&self, report: &SearchReport, config: &OutputConfig) -> io::Result<()> {
        println!("\n{}", Self::render_report(report, config));
        Ok(())
    }

    fn display_direct_key(&self, check: &DirectKeyCheck, config: &OutputConfig) -> io::Result<()> {
        println!(
            "🔑 Supplied key {} → {}",
            config.key_text(&check.key),
            check.key.address
        );
        if check.matches_target {
            println!("✅ Key matches target address");
        } else {
            println!("⚠️  WARNING: Key doesn't match target address!");
        }
        Ok(())
    }

    fn display_transfer(&self, receipt: &TransferReceipt, _config: &OutputConfig) -> io::Result<()> {
        println!("✅ Transfer successful!");
        println!("   Amount: {} ETH", format_ether(receipt.amount));
        println!("   Tx: {}", receipt.tx_hash);
        if let Some(block) = receipt.block_number {
            println!("   Block: {block}");
        }
        Ok(())
    }

    fn display_error(&self, error: &str, _config: &OutputConfig) -> io::Result<()> {
        eprintln!("❌ {error}");
        Ok(())
    }
}

/// JSON output, one document per call
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }

    fn key_to_json(key: &ValidatedKey, config: &OutputConfig) -> Value {
        json!({
            "key": config.key_text(key),
            "address": key.address,
            "source": key.key.source().to_string(),
        })
    }

    pub fn report_to_json(report: &SearchReport, config: &OutputConfig) -> Value {
        let mut value = json!({
            "outcome": report.outcome.kind(),
            "stats": report.stats,
        });
        match &report.outcome {
            RecoveryOutcome::ExactMatch(key) => {
                value["match"] = Self::key_to_json(key, config);
            }
            RecoveryOutcome::Candidates(candidates) => {
                value["candidates"] = Value::Array(
                    candidates
                        .iter()
                        .map(|key| Self::key_to_json(key, config))
                        .collect(),
                );
            }
            RecoveryOutcome::NoMatch => {}
        }
        value
    }

    pub fn parameters_to_json(params: &WalletParameters) -> Value {
        json!({
            "parameters": {
                "master_keys": params.master_keys.len(),
                "target_master_keys": params.target_master_keys.len(),
                "salts": params.salts.len(),
                "ivs": params.ivs.len(),
                "iteration_counts": params.iteration_counts,
                "ciphertexts": params.ciphertexts.len(),
                "has_password": params.has_password(),
            }
        })
    }

    fn print(value: &Value) -> io::Result<()> {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        println!("{text}");
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn display_parameters(&self, params: &WalletParameters, _config: &OutputConfig) -> io::Result<()> {
        Self::print(&Self::parameters_to_json(params))
    }

    fn display_report(&self, report: &SearchReport, config: &OutputConfig) -> io::Result<()> {
        Self::print(&Self::report_to_json(report, config))
    }

    fn display_direct_key(&self, check: &DirectKeyCheck, config: &OutputConfig) -> io::Result<()> {
        let mut value = Self::key_to_json(&check.key, config);
        value["matches_target"] = Value::Bool(check.matches_target);
        Self::print(&json!({ "direct_key": value }))
    }

    fn display_transfer(&self, receipt: &TransferReceipt, _config: &OutputConfig) -> io::Result<()> {
        Self::print(&json!({ "transfer": receipt }))
    }

    fn display_error(&self, error: &str, _config: &OutputConfig) -> io::Result<()> {
        let text = serde_json::to_string_pretty(&json!({ "error": error }))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        eprintln!("{text}");
        Ok(())
    }
}

/// Creates an output formatter for the configured format
pub fn create_output_formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter::new()),
        OutputFormat::Detailed | OutputFormat::Summary => Box::new(ConsoleFormatter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data_structures::{CandidateKey, KeySource},
        recovery::SearchStats,
    };

    fn validated(last: u8, source: KeySource) -> ValidatedKey {
        let mut bytes = [0u8; 32];
        bytes[31] = last;
        ValidatedKey::new(CandidateKey::new(bytes, source), format!("0xaddr{last}"))
    }

    fn report(outcome: RecoveryOutcome) -> SearchReport {
        SearchReport {
            outcome,
            stats: SearchStats {
                combinations_total: 4,
                combinations_attempted: 4,
                ..SearchStats::default()
            },
        }
    }

    #[test]
    fn test_keys_are_masked_by_default() {
        let config = OutputConfig::default();
        let key = validated(1, KeySource::HexPattern);
        assert_eq!(config.key_text(&key), "000000...0001");

        let shown = OutputConfig {
            show_keys: true,
            ..config
        };
        assert_eq!(shown.key_text(&key), format!("0x{}01", "00".repeat(31)));
    }

    #[test]
    fn test_console_candidates_are_numbered() {
        let report = report(RecoveryOutcome::Candidates(vec![
            validated(1, KeySource::HexPattern),
            validated(2, KeySource::SlidingWindow),
        ]));
        let text = ConsoleFormatter::render_report(&report, &OutputConfig::default());
        assert!(text.contains("Found 2 potential keys"));
        assert!(text.contains("1. 000000...0001 → 0xaddr1"));
        assert!(text.contains("2. 000000...0002 → 0xaddr2"));

        let detailed = OutputConfig {
            format: OutputFormat::Detailed,
            show_keys: false,
        };
        let text = ConsoleFormatter::render_report(&report, &detailed);
        assert!(text.contains("(sliding-window)"));
        assert!(text.contains("4 attempted"));
    }

    #[test]
    fn test_json_report_shape() {
        let config = OutputConfig {
            format: OutputFormat::Json,
            show_keys: false,
        };
        let value = JsonFormatter::report_to_json(
            &report(RecoveryOutcome::ExactMatch(validated(1, KeySource::MasterKeyHint))),
            &config,
        );
        assert_eq!(value["outcome"], "exact_match");
        assert_eq!(value["match"]["address"], "0xaddr1");
        assert_eq!(value["match"]["source"], "master-key-hint");
        assert_eq!(value["stats"]["combinations_total"], 4);

        let none = JsonFormatter::report_to_json(&report(RecoveryOutcome::NoMatch), &config);
        assert_eq!(none["outcome"], "no_match");
        assert!(none.get("candidates").is_none());
    }
}

//! Combinatorial decryption search with early exit

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex, PoisonError,
};

use rayon::prelude::*;
use tracing::{debug, info};
use zeroize::Zeroizing;

use super::{
    cancellation::CancellationToken,
    candidates::{dedupe_by_key_bytes, dedupe_by_value, CandidateKeyExtractor},
    combinations::CombinationSpace,
    hd_probe::HdDerivationProbe,
    outcome::{AttemptOutcome, RecoveryOutcome, SearchReport, SearchStats, SkipReason},
    validator::KeyCandidateValidator,
};
use crate::{
    config::{RecoveryConfig, SearchMode},
    crypto::{decrypt_with_password, BLOCK_SIZE},
    data_structures::{DecryptionAttempt, ValidatedKey, WalletParameters},
    errors::{RecoveryError, RecoveryResult},
    hex_utils::decode_hex_param,
    identity::{EthereumIdentity, IdentityDeriver},
};

/// Pick the password: explicit argument, then the one found in the backup,
/// then `prompt`. Empty values count as absent.
pub fn resolve_password<F>(
    explicit: Option<&str>,
    params: &WalletParameters,
    prompt: F,
) -> RecoveryResult<Zeroizing<String>>
where
    F: FnOnce() -> std::io::Result<String>,
{
    if let Some(password) = explicit.filter(|p| !p.is_empty()) {
        debug!("Using password supplied by the caller");
        return Ok(Zeroizing::new(password.to_string()));
    }
    if let Some(password) = params.password.as_ref().filter(|p| !p.is_empty()) {
        debug!("Using password found in the backup");
        return Ok(password.clone());
    }
    let prompted = Zeroizing::new(prompt().map_err(|e| RecoveryError::Password(e.to_string()))?);
    if prompted.is_empty() {
        return Err(RecoveryError::Password("empty password".to_string()));
    }
    Ok(prompted)
}

/// Drives the search over every parameter combination
#[derive(Debug, Clone)]
pub struct DecryptionEngine<D = EthereumIdentity> {
    extractor: CandidateKeyExtractor,
    validator: KeyCandidateValidator<D>,
    hd_probe: Option<HdDerivationProbe>,
    mode: SearchMode,
}

impl DecryptionEngine<EthereumIdentity> {
    /// Engine validating against Ethereum addresses
    pub fn new(config: &RecoveryConfig) -> Self {
        Self::with_deriver(config, EthereumIdentity::new())
    }
}

impl<D: IdentityDeriver> DecryptionEngine<D> {
    pub fn with_deriver(config: &RecoveryConfig, deriver: D) -> Self {
        Self {
            extractor: CandidateKeyExtractor::new(),
            validator: KeyCandidateValidator::new(deriver, config.target_identity.clone()),
            hd_probe: config.hd_probe.then(HdDerivationProbe::new),
            mode: config.search_mode,
        }
    }

    /// Replace the HD probe (or disable it with `None`)
    pub fn with_hd_probe(mut self, probe: Option<HdDerivationProbe>) -> Self {
        self.hd_probe = probe;
        self
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn validator(&self) -> &KeyCandidateValidator<D> {
        &self.validator
    }

    /// Run a single combination to completion
    pub fn attempt(&self, attempt: &DecryptionAttempt<'_>, password: &[u8]) -> AttemptOutcome {
        let mut tested = 0;
        let token = super::cancellation::AtomicCancellationToken::new();
        self.run_attempt(attempt, password, &token, &mut tested)
    }

    fn run_attempt<T: CancellationToken + ?Sized>(
        &self,
        attempt: &DecryptionAttempt<'_>,
        password: &[u8],
        token: &T,
        tested: &mut usize,
    ) -> AttemptOutcome {
        if token.is_cancelled() {
            return AttemptOutcome::Skipped(SkipReason::Cancelled);
        }

        let salt = match decode_hex_param("salt", attempt.salt) {
            Ok(bytes) => bytes,
            Err(_) => return AttemptOutcome::Skipped(SkipReason::MalformedHex { field: "salt" }),
        };
        let iv = match decode_hex_param("iv", attempt.iv) {
            Ok(bytes) => bytes,
            Err(_) => return AttemptOutcome::Skipped(SkipReason::MalformedHex { field: "iv" }),
        };
        let ciphertext = match decode_hex_param("ct", attempt.ciphertext) {
            Ok(bytes) => bytes,
            Err(_) => return AttemptOutcome::Skipped(SkipReason::MalformedHex { field: "ct" }),
        };
        if iv.len() != BLOCK_SIZE {
            return AttemptOutcome::Skipped(SkipReason::InvalidIvLength(iv.len()));
        }
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return AttemptOutcome::Skipped(SkipReason::InvalidCiphertextLength(ciphertext.len()));
        }

        let plaintext = match decrypt_with_password(
            password,
            &salt,
            attempt.iteration_count,
            &iv,
            &ciphertext,
        ) {
            Ok(plaintext) => plaintext,
            Err(e) => return AttemptOutcome::Skipped(SkipReason::Crypto(e.to_string())),
        };

        let mut keys = self.extractor.extract(&plaintext, attempt.master_key_hint);
        if let Some(probe) = &self.hd_probe {
            keys.extend(probe.derive(&plaintext));
            keys = dedupe_by_value(keys);
        }
        debug!(combination = attempt.index, candidates = keys.len(), "Decrypted");

        self.validator.validate_all(keys, token, tested)
    }

    /// Search every combination; the outcome only.
    pub fn search<T: CancellationToken + ?Sized>(
        &self,
        params: &WalletParameters,
        password: &str,
        token: &T,
    ) -> RecoveryResult<RecoveryOutcome> {
        self.search_with_stats(params, password, token)
            .map(|report| report.outcome)
    }

    /// Search every combination and report counters alongside the outcome.
    ///
    /// Fails only when required parameters are missing. A match cancels
    /// `token`; an externally cancelled token ends the search with the
    /// candidates collected so far.
    pub fn search_with_stats<T: CancellationToken + ?Sized>(
        &self,
        params: &WalletParameters,
        password: &str,
        token: &T,
    ) -> RecoveryResult<SearchReport> {
        if !params.has_required_params() {
            return Err(RecoveryError::MissingParameters);
        }

        let space = CombinationSpace::new(params);
        info!(
            combinations = space.len(),
            master_keys = space.hint_count(),
            mode = ?self.mode,
            "Starting decryption search"
        );

        let report = match self.mode {
            SearchMode::Sequential => self.search_sequential(&space, password.as_bytes(), token),
            SearchMode::Parallel => self.search_parallel(&space, password.as_bytes(), token),
        };

        info!(
            outcome = report.outcome.kind(),
            attempted = report.stats.combinations_attempted,
            skipped = report.stats.combinations_skipped,
            tested = report.stats.candidates_tested,
            "Search finished"
        );
        Ok(report)
    }

    fn search_sequential<T: CancellationToken + ?Sized>(
        &self,
        space: &CombinationSpace<'_>,
        password: &[u8],
        token: &T,
    ) -> SearchReport {
        let mut stats = SearchStats {
            combinations_total: space.len(),
            ..SearchStats::default()
        };
        let mut collected = Vec::new();

        for attempt in space.iter() {
            if token.is_cancelled() {
                break;
            }
            stats.combinations_attempted += 1;
            debug!("Trying combination {}", attempt);

            match self.run_attempt(&attempt, password, token, &mut stats.candidates_tested) {
                AttemptOutcome::Matched(found) => {
                    info!(combination = attempt.index, "Exact match found");
                    return SearchReport {
                        outcome: RecoveryOutcome::ExactMatch(found),
                        stats,
                    };
                }
                AttemptOutcome::Candidates(keys) => collected.extend(keys),
                AttemptOutcome::Skipped(reason) => {
                    stats.combinations_skipped += 1;
                    debug!(combination = attempt.index, "Skipped: {}", reason);
                }
            }
        }

        stats.cancelled = token.is_cancelled();
        SearchReport {
            outcome: RecoveryOutcome::from_candidates(rank_candidates(collected)),
            stats,
        }
    }

    fn search_parallel<T: CancellationToken + ?Sized>(
        &self,
        space: &CombinationSpace<'_>,
        password: &[u8],
        token: &T,
    ) -> SearchReport {
        let attempted = AtomicUsize::new(0);
        let skipped = AtomicUsize::new(0);
        let tested = AtomicUsize::new(0);
        let collector: Mutex<Vec<(usize, Vec<ValidatedKey>)>> = Mutex::new(Vec::new());

        let found = (0..space.len()).into_par_iter().find_map_any(|index| {
            if token.is_cancelled() {
                return None;
            }
            let attempt = space.get(index)?;
            attempted.fetch_add(1, Ordering::Relaxed);
            debug!("Trying combination {}", attempt);

            let mut local_tested = 0;
            let outcome = self.run_attempt(&attempt, password, token, &mut local_tested);
            tested.fetch_add(local_tested, Ordering::Relaxed);

            match outcome {
                AttemptOutcome::Matched(found) => {
                    info!(combination = index, "Exact match found");
                    token.cancel();
                    Some(found)
                }
                AttemptOutcome::Candidates(keys) => {
                    if !keys.is_empty() {
                        collector
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push((index, keys));
                    }
                    None
                }
                AttemptOutcome::Skipped(reason) => {
                    skipped.fetch_add(1, Ordering::Relaxed);
                    debug!(combination = index, "Skipped: {}", reason);
                    None
                }
            }
        });

        let mut stats = SearchStats {
            combinations_total: space.len(),
            combinations_attempted: attempted.into_inner(),
            combinations_skipped: skipped.into_inner(),
            candidates_tested: tested.into_inner(),
            cancelled: false,
        };

        if let Some(found) = found {
            return SearchReport {
                outcome: RecoveryOutcome::ExactMatch(found),
                stats,
            };
        }

        stats.cancelled = token.is_cancelled();
        let mut batches = collector.into_inner().unwrap_or_else(PoisonError::into_inner);
        batches.sort_by_key(|(index, _)| *index);
        let collected = batches.into_iter().flat_map(|(_, keys)| keys).collect();
        SearchReport {
            outcome: RecoveryOutcome::from_candidates(rank_candidates(collected)),
            stats,
        }
    }
}

fn validated_bytes(key: &ValidatedKey) -> &[u8; 32] {
    key.key.as_bytes()
}

/// Dedupe by key bytes (first wins), then order by provenance rank, keeping
/// discovery order within a rank.
pub fn rank_candidates(candidates: Vec<ValidatedKey>) -> Vec<ValidatedKey> {
    let mut ranked = dedupe_by_key_bytes(candidates, validated_bytes);
    ranked.sort_by_key(|candidate| candidate.key.source().rank());
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        crypto::encrypt_with_password,
        data_structures::{ParameterField, TargetIdentity},
        recovery::cancellation::AtomicCancellationToken,
    };

    const ADDRESS_OF_ONE: &str = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";

    fn key_one() -> [u8; 32] {
        let mut key = [0u8; 32];
        key[31] = 1;
        key
    }

    fn config(mode: SearchMode) -> RecoveryConfig {
        RecoveryConfig::new(TargetIdentity::new(ADDRESS_OF_ONE))
            .with_search_mode(mode)
            .with_hd_probe(false)
    }

    fn backup_params(plaintext: &[u8], password: &str) -> WalletParameters {
        let salt = [0x42u8; 8];
        let iv = [0x24u8; 16];
        let ct = encrypt_with_password(password.as_bytes(), &salt, 5, &iv, plaintext).unwrap();

        let mut params = WalletParameters::new();
        params.add_value(ParameterField::Salt, &hex::encode(salt));
        params.add_iteration_count(5);
        params.add_value(ParameterField::Iv, &hex::encode(iv));
        params.add_value(ParameterField::Ciphertext, &hex::encode(ct));
        params
    }

    #[test]
    fn test_missing_parameters_is_an_error() {
        let engine = DecryptionEngine::new(&config(SearchMode::Sequential));
        let token = AtomicCancellationToken::new();
        let result = engine.search(&WalletParameters::new(), "pw", &token);
        assert!(matches!(result, Err(RecoveryError::MissingParameters)));
    }

    #[test]
    fn test_spec_example_makes_one_attempt() {
        let engine = DecryptionEngine::new(&config(SearchMode::Sequential));
        let token = AtomicCancellationToken::new();
        let mut params = WalletParameters::new();
        params.add_value(ParameterField::Salt, "aa");
        params.add_iteration_count(1000);
        params.add_value(ParameterField::Iv, "bb");
        params.add_value(ParameterField::Ciphertext, "cc");

        let report = engine.search_with_stats(&params, "hunter2", &token).unwrap();
        assert_eq!(report.stats.combinations_total, 1);
        assert_eq!(report.stats.combinations_attempted, 1);
        // One-byte IV is skipped, not fatal
        assert_eq!(report.stats.combinations_skipped, 1);
        assert!(matches!(report.outcome, RecoveryOutcome::NoMatch));
    }

    #[test]
    fn test_finds_key_in_plaintext() {
        let params = backup_params(&key_one(), "pw");
        for mode in [SearchMode::Sequential, SearchMode::Parallel] {
            let engine = DecryptionEngine::new(&config(mode));
            let token = AtomicCancellationToken::new();
            let outcome = engine.search(&params, "pw", &token).unwrap();
            let found = outcome.exact_match().expect("match");
            assert_eq!(found.address, ADDRESS_OF_ONE);
            assert_eq!(found.key.as_bytes(), &key_one());
        }
    }

    #[test]
    fn test_early_exit_stops_sequential_search() {
        let mut params = backup_params(&key_one(), "pw");
        // Second ciphertext would be attempted after the match
        params.add_value(ParameterField::Ciphertext, &"00".repeat(32));
        let engine = DecryptionEngine::new(&config(SearchMode::Sequential));
        let token = AtomicCancellationToken::new();
        let report = engine.search_with_stats(&params, "pw", &token).unwrap();
        assert!(report.outcome.exact_match().is_some());
        assert_eq!(report.stats.combinations_total, 2);
        assert_eq!(report.stats.combinations_attempted, 1);
    }

    #[test]
    fn test_malformed_hex_skips_only_that_combination() {
        let mut params = backup_params(&key_one(), "pw");
        params.salts.insert(0, "not-hex".to_string());
        let engine = DecryptionEngine::new(&config(SearchMode::Sequential));
        let token = AtomicCancellationToken::new();
        let report = engine.search_with_stats(&params, "pw", &token).unwrap();
        assert_eq!(report.stats.combinations_skipped, 1);
        assert!(report.outcome.exact_match().is_some());
    }

    #[test]
    fn test_attempt_reports_skip_reasons() {
        let engine = DecryptionEngine::new(&config(SearchMode::Sequential));
        let base = DecryptionAttempt {
            index: 0,
            salt: "00",
            iteration_count: 1,
            iv: &"00".repeat(16),
            ciphertext: &"00".repeat(16),
            master_key_hint: None,
        };
        let bad_salt = DecryptionAttempt { salt: "zz", ..base };
        assert!(matches!(
            engine.attempt(&bad_salt, b"pw"),
            AttemptOutcome::Skipped(SkipReason::MalformedHex { field: "salt" })
        ));
        let short_iv = DecryptionAttempt { iv: "0011", ..base };
        assert!(matches!(
            engine.attempt(&short_iv, b"pw"),
            AttemptOutcome::Skipped(SkipReason::InvalidIvLength(2))
        ));
        let odd_ct = DecryptionAttempt { ciphertext: "0011", ..base };
        assert!(matches!(
            engine.attempt(&odd_ct, b"pw"),
            AttemptOutcome::Skipped(SkipReason::InvalidCiphertextLength(2))
        ));
        assert!(matches!(
            engine.attempt(&base, b"pw"),
            AttemptOutcome::Candidates(_)
        ));
    }

    #[test]
    fn test_cancelled_token_attempts_nothing() {
        let params = backup_params(&key_one(), "pw");
        for mode in [SearchMode::Sequential, SearchMode::Parallel] {
            let engine = DecryptionEngine::new(&config(mode));
            let token = AtomicCancellationToken::cancelled();
            let report = engine.search_with_stats(&params, "pw", &token).unwrap();
            assert_eq!(report.stats.combinations_attempted, 0);
            assert!(report.stats.cancelled);
            assert!(matches!(report.outcome, RecoveryOutcome::NoMatch));
        }
    }

    #[test]
    fn test_resolve_password_precedence() {
        let mut params = WalletParameters::new();
        let explicit = resolve_password(Some("cli"), &params, || Ok("prompt".into())).unwrap();
        assert_eq!(explicit.as_str(), "cli");

        params.set_password_if_absent("backup");
        let from_backup = resolve_password(None, &params, || Ok("prompt".into())).unwrap();
        assert_eq!(from_backup.as_str(), "backup");

        let prompted =
            resolve_password(Some(""), &WalletParameters::new(), || Ok("typed".into())).unwrap();
        assert_eq!(prompted.as_str(), "typed");

        let failed = resolve_password(None, &WalletParameters::new(), || {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no tty"))
        });
        assert!(matches!(failed, Err(RecoveryError::Password(_))));
    }
}

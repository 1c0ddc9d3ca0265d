//! Validation of an operator-supplied private key

use tracing::info;
use zeroize::Zeroizing;

use crate::{
    data_structures::{CandidateKey, KeySource, TargetIdentity, ValidatedKey},
    errors::RecoveryResult,
    hex_utils::parse_private_key_hex,
    identity::IdentityDeriver,
};

/// A supplied key with its identity and whether that identity is the target
#[derive(Debug, Clone)]
pub struct DirectKeyCheck {
    pub key: ValidatedKey,
    pub matches_target: bool,
}

/// Parse `key_hex` (optional `0x`), derive its identity and compare to `target`.
///
/// Unlike candidates found by the search, a bad supplied key is an error.
pub fn validate_direct_key<D: IdentityDeriver + ?Sized>(
    key_hex: &str,
    deriver: &D,
    target: &TargetIdentity,
) -> RecoveryResult<DirectKeyCheck> {
    let bytes = Zeroizing::new(parse_private_key_hex(key_hex)?);
    let address = deriver.derive_address(&bytes)?;
    let matches_target = target.matches(&address);
    let key = CandidateKey::new(*bytes, KeySource::Supplied);
    info!(key = %key.masked(), %address, matches_target, "Checked supplied key");
    Ok(DirectKeyCheck {
        key: ValidatedKey::new(key, address),
        matches_target,
    })
}

//! Runtime configuration for a recovery run
//!
//! A [`RecoveryConfig`] is assembled once (by the CLI, or by a library
//! caller) and handed by reference to every component. Nothing in the crate
//! mutates it afterwards.

use std::time::Duration;

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::data_structures::TargetIdentity;

/// Default JSON-RPC endpoint for the transfer collaborator
pub const DEFAULT_RPC_URL: &str = "https://eth.llamarpc.com";
/// Standard gas allowance for a plain value transfer
pub const DEFAULT_GAS_LIMIT: u64 = 21_000;
/// 0.005 ETH left behind in the source account
pub const DEFAULT_MIN_BALANCE_WEI: u64 = 5_000_000_000_000_000;
/// How long to wait for a transfer receipt
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

/// How the combination space is traversed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMode {
    /// One combination at a time, in traversal order
    Sequential,
    /// Rayon work-stealing over the combination indices
    Parallel,
}

impl std::str::FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" => Ok(SearchMode::Sequential),
            "parallel" => Ok(SearchMode::Parallel),
            _ => Err(format!(
                "Invalid search mode: {}. Valid options: sequential, parallel",
                s
            )),
        }
    }
}

/// Output format options for recovery results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Every candidate with its provenance
    Detailed,
    /// Counts plus the ranked candidate list
    Summary,
    /// JSON output for programmatic consumption
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "detailed" => Ok(OutputFormat::Detailed),
            "summary" => Ok(OutputFormat::Summary),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Invalid output format: {}. Valid options: detailed, summary, json",
                s
            )),
        }
    }
}

/// Immutable configuration for recovery and transfer
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Address the recovered key must control
    pub target_identity: TargetIdentity,
    /// Destination for recovered funds
    pub recovery_identity: Option<String>,
    /// JSON-RPC endpoint used by the transfer collaborator
    pub rpc_url: String,
    /// Balance left untouched in the source account
    pub min_balance_wei: U256,
    /// Gas allowance for the transfer
    pub gas_limit: u64,
    /// Receipt polling deadline
    pub confirmation_timeout: Duration,
    /// Sequential or parallel traversal
    pub search_mode: SearchMode,
    /// Whether to try decrypted bytes as HD seed entropy
    pub hd_probe: bool,
}

impl RecoveryConfig {
    /// Create a config with defaults for everything except the target
    pub fn new(target_identity: TargetIdentity) -> Self {
        Self {
            target_identity,
            recovery_identity: None,
            rpc_url: DEFAULT_RPC_URL.to_string(),
            min_balance_wei: U256::from(DEFAULT_MIN_BALANCE_WEI),
            gas_limit: DEFAULT_GAS_LIMIT,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            search_mode: SearchMode::Parallel,
            hd_probe: true,
        }
    }

    /// Set the destination address for recovered funds
    pub fn with_recovery_identity(mut self, address: impl Into<String>) -> Self {
        self.recovery_identity = Some(address.into());
        self
    }

    /// Set the JSON-RPC endpoint
    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = url.into();
        self
    }

    /// Set the balance left behind after a transfer
    pub fn with_min_balance_wei(mut self, wei: U256) -> Self {
        self.min_balance_wei = wei;
        self
    }

    /// Set the gas allowance
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Set the receipt polling deadline
    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    /// Set the traversal mode
    pub fn with_search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    /// Enable or disable the HD derivation probe
    pub fn with_hd_probe(mut self, enabled: bool) -> Self {
        self.hd_probe = enabled;
        self
    }
}

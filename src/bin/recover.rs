//! Wallet Key Recovery
//!
//! Recovers a private key from a loosely structured wallet backup and,
//! when a destination is configured, moves the funds out of the account.
//!
//! ## Usage
//! ```bash
//! # Search a backup file
//! recover backup.txt --target-address 0x4b96... --destination 0xaD49...
//!
//! # Read the backup from stdin, machine-readable output
//! cat backup.txt | recover - --target-address 0x4b96... --format json
//!
//! # Skip extraction and check a known key
//! recover backup.txt 0x<private key> --target-address 0x4b96...
//! ```
//!
//! Every option can also come from the environment (`RECOVERY_TARGET_ADDRESS`,
//! `RECOVERY_DESTINATION`, `RECOVERY_RPC_URL`, `RECOVERY_PASSWORD`, ...).
//!
//! ## Exit codes
//! - `0` exact match found (and transferred, if a destination is set)
//! - `1` input unreadable, bad arguments or other errors
//! - `2` candidates found but no exact match
//! - `3` required parameters missing from the backup
//! - `4` no keys found
//! - `5` transfer failed
//! - `130` interrupted with Ctrl+C

use std::{
    io::{self, BufRead, IsTerminal, Write},
    str::FromStr,
    time::Duration,
};

use clap::Parser;
use primitive_types::U256;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

use wallet_key_recovery::{
    config::{
        OutputFormat, RecoveryConfig, SearchMode, DEFAULT_GAS_LIMIT, DEFAULT_MIN_BALANCE_WEI,
        DEFAULT_RPC_URL,
    },
    data_structures::{TargetIdentity, ValidatedKey},
    errors::{RecoveryError, RecoveryResult},
    extraction::{InputSource, ParameterExtractor},
    identity::EthereumIdentity,
    output::{create_output_formatter, OutputConfig, OutputFormatter},
    recovery::{
        resolve_password, validate_direct_key, AtomicCancellationToken, DecryptionEngine,
        RecoveryOutcome,
    },
    transfer::{JsonRpcTransfer, TransferExecutor},
};

const EXIT_MATCH: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_CANDIDATES: i32 = 2;
const EXIT_MISSING_PARAMS: i32 = 3;
const EXIT_NO_KEYS: i32 = 4;
const EXIT_TRANSFER_FAILED: i32 = 5;
const EXIT_INTERRUPTED: i32 = 130;

/// Wallet key recovery CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Backup file, or `-` for stdin
    #[arg(help = "Backup file path, or - to read from stdin")]
    input: String,

    /// Private key to check directly, bypassing extraction
    #[arg(help = "Private key (hex) to validate and use directly instead of searching the backup")]
    private_key: Option<String>,

    /// Address the recovered key must control
    #[arg(long, env = "RECOVERY_TARGET_ADDRESS", help = "Target address the recovered key must control")]
    target_address: String,

    /// Where recovered funds go
    #[arg(
        long,
        env = "RECOVERY_DESTINATION",
        help = "Destination address for recovered funds. Without it no transfer is attempted"
    )]
    destination: Option<String>,

    /// JSON-RPC endpoint
    #[arg(long, env = "RECOVERY_RPC_URL", default_value = DEFAULT_RPC_URL, help = "Ethereum JSON-RPC endpoint")]
    rpc_url: String,

    /// Backup password
    #[arg(
        long,
        env = "RECOVERY_PASSWORD",
        hide_env_values = true,
        help = "Wallet password. Falls back to the password in the backup, then a prompt"
    )]
    password: Option<String>,

    /// Balance left in the source account, in wei
    #[arg(
        long,
        env = "RECOVERY_MIN_BALANCE_WEI",
        default_value_t = DEFAULT_MIN_BALANCE_WEI,
        help = "Balance in wei to leave behind in the source account"
    )]
    min_balance_wei: u64,

    /// Gas allowance for the transfer
    #[arg(long, env = "RECOVERY_GAS_LIMIT", default_value_t = DEFAULT_GAS_LIMIT, help = "Gas limit for the transfer")]
    gas_limit: u64,

    /// Receipt wait in seconds
    #[arg(
        long,
        env = "RECOVERY_CONFIRMATION_TIMEOUT",
        default_value = "120",
        help = "Seconds to wait for the transfer receipt"
    )]
    confirmation_timeout: u64,

    /// Traversal mode
    #[arg(long, env = "RECOVERY_SEARCH_MODE", default_value = "parallel", help = "Search mode: sequential, parallel")]
    mode: String,

    /// Disable the HD derivation probe
    #[arg(long, help = "Do not treat decrypted bytes as HD seed entropy")]
    no_hd_probe: bool,

    /// Output format
    #[arg(long, default_value = "summary", help = "Output format: detailed, summary, json")]
    format: String,

    /// Show full keys
    #[arg(long, help = "Print full private keys instead of masked ones")]
    show_keys: bool,

    /// Answer yes to confirmations
    #[arg(short, long, help = "Assume yes for confirmation prompts")]
    yes: bool,

    /// Debug logging
    #[arg(short, long, help = "Verbose logging (debug level)")]
    verbose: bool,

    /// Warnings only
    #[arg(short, long, help = "Quiet mode - only show essential information")]
    quiet: bool,
}

fn init_logging(args: &CliArgs) {
    let level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_config(args: &CliArgs) -> RecoveryResult<RecoveryConfig> {
    let mode = SearchMode::from_str(&args.mode)
        .map_err(|e| RecoveryError::invalid_argument("--mode", e))?;
    let mut config = RecoveryConfig::new(TargetIdentity::new(args.target_address.as_str()))
        .with_rpc_url(args.rpc_url.as_str())
        .with_min_balance_wei(U256::from(args.min_balance_wei))
        .with_gas_limit(args.gas_limit)
        .with_confirmation_timeout(Duration::from_secs(args.confirmation_timeout))
        .with_search_mode(mode)
        .with_hd_probe(!args.no_hd_probe);
    if let Some(destination) = &args.destination {
        config = config.with_recovery_identity(destination.as_str());
    }
    Ok(config)
}

fn exit_code_for(error: &RecoveryError) -> i32 {
    match error {
        RecoveryError::MissingParameters => EXIT_MISSING_PARAMS,
        RecoveryError::Transfer(_) => EXIT_TRANSFER_FAILED,
        _ => EXIT_ERROR,
    }
}

fn read_answer(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn confirm(prompt: &str, assume_yes: bool) -> io::Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Ok(false);
    }
    Ok(read_answer(prompt)?.eq_ignore_ascii_case("y"))
}

/// Ask for a 1-based candidate number; `None` for cancel or bad input
fn select_candidate(count: usize) -> io::Result<Option<usize>> {
    let answer = read_answer("\nSelect key to try (0 to cancel): ")?;
    match answer.parse::<usize>() {
        Ok(0) => Ok(None),
        Ok(choice) if choice <= count => Ok(Some(choice - 1)),
        _ => {
            println!("Invalid selection");
            Ok(None)
        }
    }
}

/// Transfer to the configured destination. Returns the exit code for the transfer step.
async fn transfer_funds(
    config: &RecoveryConfig,
    key: &ValidatedKey,
    formatter: &dyn OutputFormatter,
    output: &OutputConfig,
) -> i32 {
    let Some(destination) = config.recovery_identity.as_deref() else {
        info!("No destination configured, skipping transfer");
        return EXIT_MATCH;
    };

    let executor = match JsonRpcTransfer::new(config) {
        Ok(executor) => executor,
        Err(e) => {
            let _ = formatter.display_error(&format!("Transfer failed: {e}"), output);
            return EXIT_TRANSFER_FAILED;
        }
    };

    info!(from = %key.address, to = destination, rpc = executor.rpc_url(), "Transferring funds");
    match executor.transfer(key, destination).await {
        Ok(receipt) => {
            let _ = formatter.display_transfer(&receipt, output);
            EXIT_MATCH
        }
        Err(e) => {
            let _ = formatter.display_error(&format!("Transfer failed: {e}"), output);
            EXIT_TRANSFER_FAILED
        }
    }
}

async fn run_direct_key(
    args: &CliArgs,
    key_hex: &str,
    config: &RecoveryConfig,
    formatter: &dyn OutputFormatter,
    output: &OutputConfig,
) -> RecoveryResult<i32> {
    info!("Using provided private key");
    let check = validate_direct_key(key_hex, &EthereumIdentity::new(), &config.target_identity)?;
    formatter
        .display_direct_key(&check, output)
        .map_err(|e| RecoveryError::invalid_argument("output", e.to_string()))?;

    if !check.matches_target {
        let proceed = config.recovery_identity.is_some()
            && confirm("Continue anyway? (y/n): ", args.yes)
                .map_err(|e| RecoveryError::invalid_argument("confirmation", e.to_string()))?;
        if !proceed {
            return Ok(EXIT_NO_KEYS);
        }
    }

    let code = transfer_funds(config, &check.key, formatter, output).await;
    if code == EXIT_MATCH && !check.matches_target {
        return Ok(EXIT_NO_KEYS);
    }
    Ok(code)
}

async fn run(
    args: &CliArgs,
    explicit_password: Option<&str>,
    formatter: &dyn OutputFormatter,
    output: &OutputConfig,
) -> RecoveryResult<i32> {
    let config = build_config(args)?;
    let source = InputSource::from_arg(&args.input);
    if !source.exists() {
        return Err(RecoveryError::Input {
            path: source.describe().to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "file not found"),
        });
    }

    info!(target_address = %config.target_identity, destination = ?config.recovery_identity, "Wallet key recovery");

    if let Some(key_hex) = args.private_key.as_deref() {
        return run_direct_key(args, key_hex, &config, formatter, output).await;
    }

    info!("Extracting parameters from {}", source.describe());
    let params = ParameterExtractor::default().extract_from_source(&source)?;
    if !params.has_required_params() {
        warn!("Insufficient wallet parameters found: {}", params);
        return Ok(EXIT_MISSING_PARAMS);
    }
    let _ = formatter.display_parameters(&params, output);

    if params.has_password() && explicit_password.is_none() {
        info!("Using password from backup");
    }
    let password = resolve_password(explicit_password, &params, || {
        rpassword::prompt_password("Enter wallet password: ")
    })?;

    let engine = DecryptionEngine::new(&config);
    let (token, handle) = AtomicCancellationToken::create_pair();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping search");
            handle.cancel();
        }
    });

    let report = tokio::task::spawn_blocking(move || engine.search_with_stats(&params, &password, &token))
        .await
        .map_err(|e| RecoveryError::SearchTask(e.to_string()))??;

    let _ = formatter.display_report(&report, output);
    let interrupted = report.stats.cancelled;

    match &report.outcome {
        RecoveryOutcome::ExactMatch(key) => {
            info!("Attempting transfer with found key");
            Ok(transfer_funds(&config, key, formatter, output).await)
        }
        RecoveryOutcome::Candidates(candidates) => {
            if interrupted {
                return Ok(EXIT_INTERRUPTED);
            }
            let interactive = config.recovery_identity.is_some()
                && output.format != OutputFormat::Json
                && io::stdin().is_terminal();
            if interactive {
                let choice = select_candidate(candidates.len())
                    .map_err(|e| RecoveryError::invalid_argument("selection", e.to_string()))?;
                if let Some(index) = choice {
                    let code = transfer_funds(&config, &candidates[index], formatter, output).await;
                    if code == EXIT_TRANSFER_FAILED {
                        return Ok(code);
                    }
                }
            }
            Ok(EXIT_CANDIDATES)
        }
        RecoveryOutcome::NoMatch if interrupted => Ok(EXIT_INTERRUPTED),
        RecoveryOutcome::NoMatch => Ok(EXIT_NO_KEYS),
    }
}

#[tokio::main]
async fn main() {
    let mut args = CliArgs::parse();
    let password = args.password.take().map(Zeroizing::new);
    init_logging(&args);

    let format = match OutputFormat::from_str(&args.format) {
        Ok(format) => format,
        Err(e) => {
            eprintln!("❌ Error: {e}");
            std::process::exit(EXIT_ERROR);
        }
    };
    let output = OutputConfig {
        format,
        show_keys: args.show_keys,
    };
    let formatter = create_output_formatter(format);

    let explicit_password = password.as_ref().map(|p| p.as_str());
    let code = match run(&args, explicit_password, formatter.as_ref(), &output).await {
        Ok(code) => code,
        Err(e) => {
            let _ = formatter.display_error(&e.to_string(), &output);
            exit_code_for(&e)
        }
    };
    let _ = formatter.flush();
    std::process::exit(code);
}

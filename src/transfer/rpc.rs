//! JSON-RPC transfer executor
//!
//! One `eth_*` call per step, no retries. The receipt is polled until it
//! appears or the confirmation timeout expires.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use primitive_types::U256;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{
    format_ether,
    transaction::{parse_address, LegacyTransaction},
    TransferExecutor, TransferPlan, TransferReceipt,
};
use crate::{
    config::RecoveryConfig,
    data_structures::ValidatedKey,
    errors::TransferError,
    hex_utils::{clean_hex, mask_key},
};

/// Interval between receipt polls
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Per-request HTTP timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcReceipt {
    status: Option<String>,
    #[serde(rename = "blockNumber")]
    block_number: Option<String>,
}

/// Parse a `0x`-prefixed quantity
pub fn parse_quantity(value: &str) -> Result<U256, TransferError> {
    let digits = clean_hex(value.trim());
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| TransferError::InvalidResponse(format!("bad quantity '{value}': {e:?}")))
}

fn quantity_to_u64(value: &str) -> Result<u64, TransferError> {
    let parsed = parse_quantity(value)?;
    if parsed > U256::from(u64::MAX) {
        return Err(TransferError::InvalidResponse(format!(
            "quantity '{value}' exceeds 64 bits"
        )));
    }
    Ok(parsed.low_u64())
}

/// Transfer executor backed by an Ethereum JSON-RPC endpoint
#[derive(Debug)]
pub struct JsonRpcTransfer {
    client: Client,
    rpc_url: String,
    gas_limit: u64,
    min_balance: U256,
    confirmation_timeout: Duration,
    poll_interval: Duration,
    request_id: AtomicU64,
}

impl JsonRpcTransfer {
    pub fn new(config: &RecoveryConfig) -> Result<Self, TransferError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransferError::Unreachable(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            rpc_url: config.rpc_url.clone(),
            gas_limit: config.gas_limit,
            min_balance: config.min_balance_wei,
            confirmation_timeout: config.confirmation_timeout,
            poll_interval: RECEIPT_POLL_INTERVAL,
            request_id: AtomicU64::new(1),
        })
    }

    /// Override the receipt poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn call_optional<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<T>, TransferError> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, "JSON-RPC request");

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransferError::Unreachable(format!("{method}: {e}")))?;

        if !response.status().is_success() {
            return Err(TransferError::Unreachable(format!(
                "{method}: HTTP {}",
                response.status()
            )));
        }

        let parsed: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| TransferError::InvalidResponse(format!("{method}: {e}")))?;

        if let Some(error) = parsed.error {
            return Err(TransferError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(parsed.result)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, TransferError> {
        self.call_optional(method, params)
            .await?
            .ok_or_else(|| TransferError::InvalidResponse(format!("{method}: missing result")))
    }

    async fn quantity(&self, method: &str, params: Value) -> Result<U256, TransferError> {
        let raw: String = self.call(method, params).await?;
        parse_quantity(&raw)
    }

    /// Current balance of `address` in wei
    pub async fn balance_of(&self, address: &str) -> Result<U256, TransferError> {
        self.quantity("eth_getBalance", json!([address, "latest"])).await
    }

    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<RpcReceipt, TransferError> {
        let deadline = Instant::now() + self.confirmation_timeout;
        loop {
            let receipt: Option<RpcReceipt> = self
                .call_optional("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;
            if let Some(receipt) = receipt {
                return Ok(receipt);
            }
            if Instant::now() >= deadline {
                return Err(TransferError::Timeout(self.confirmation_timeout));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl TransferExecutor for JsonRpcTransfer {
    async fn transfer(&self, key: &ValidatedKey, to: &str) -> Result<TransferReceipt, TransferError> {
        let destination = parse_address(to)?;
        let from = key.address.clone();

        let chain_id = quantity_to_u64(&self.call::<String>("eth_chainId", json!([])).await?)?;
        let gas_price = self.quantity("eth_gasPrice", json!([])).await?;
        let balance = self.balance_of(&from).await?;
        let nonce = self
            .quantity("eth_getTransactionCount", json!([from, "latest"]))
            .await?;

        let plan = TransferPlan::compute(balance, gas_price, self.gas_limit, self.min_balance)?;
        info!(
            from = %from,
            to,
            amount_eth = %format_ether(plan.amount),
            balance_eth = %format_ether(balance),
            chain_id,
            "Sending transfer"
        );

        let tx = LegacyTransaction {
            nonce,
            gas_price,
            gas_limit: U256::from(self.gas_limit),
            to: destination,
            value: plan.amount,
            data: Vec::new(),
            chain_id,
        };
        let signed = tx.sign(key.key.as_bytes())?;
        debug!(key = %mask_key(&key.key.to_hex()), "Signed transfer");

        let tx_hash: String = self
            .call("eth_sendRawTransaction", json!([signed.raw_hex()]))
            .await?;
        info!(tx_hash = %tx_hash, "Transaction submitted, waiting for receipt");

        let receipt = self.wait_for_receipt(&tx_hash).await?;
        if receipt.status.as_deref() != Some("0x1") {
            return Err(TransferError::Rejected(format!(
                "transaction {tx_hash} failed with status {}",
                receipt.status.as_deref().unwrap_or("unknown")
            )));
        }

        let block_number = match receipt.block_number.as_deref() {
            Some(block) => Some(quantity_to_u64(block)?),
            None => None,
        };
        info!(tx_hash = %tx_hash, ?block_number, "Transfer confirmed");

        Ok(TransferReceipt {
            tx_hash,
            from,
            to: to.to_string(),
            amount: plan.amount,
            block_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::{CandidateKey, KeySource, TargetIdentity};

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x0").unwrap(), U256::zero());
        assert_eq!(parse_quantity("0x").unwrap(), U256::zero());
        assert_eq!(parse_quantity("0x1bc16d674ec80000").unwrap(), U256::exp10(18) * 2);
        assert!(parse_quantity("0xzz").is_err());
        assert_eq!(quantity_to_u64("0x89").unwrap(), 137);
        assert!(quantity_to_u64(&format!("0x1{}", "0".repeat(16))).is_err());
    }

    #[test]
    fn test_rpc_response_shapes() {
        let ok: RpcResponse<String> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#).unwrap();
        assert_eq!(ok.result.as_deref(), Some("0x1"));

        let pending: RpcResponse<RpcReceipt> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":2,"result":null}"#).unwrap();
        assert!(pending.result.is_none());
        assert!(pending.error.is_none());

        let err: RpcResponse<String> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":3,"error":{"code":-32000,"message":"nonce too low"}}"#,
        )
        .unwrap();
        assert_eq!(err.error.unwrap().code, -32000);
    }

    #[tokio::test]
    async fn test_unreachable_node() {
        let config = RecoveryConfig::new(TargetIdentity::new("0x00"))
            .with_rpc_url("http://127.0.0.1:1");
        let executor = JsonRpcTransfer::new(&config).unwrap();
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        let key = ValidatedKey::new(
            CandidateKey::new(bytes, KeySource::Supplied),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf".to_string(),
        );
        let err = executor
            .transfer(&key, "0x2B5AD5c4795c026514f8317c7a215E218DcCD6cF")
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_bad_destination_fails_before_network() {
        let config = RecoveryConfig::new(TargetIdentity::new("0x00"))
            .with_rpc_url("http://127.0.0.1:1");
        let executor = JsonRpcTransfer::new(&config).unwrap();
        let key = ValidatedKey::new(
            CandidateKey::new([1u8; 32], KeySource::Supplied),
            "0x00".to_string(),
        );
        let err = executor.transfer(&key, "not-an-address").await.unwrap_err();
        assert!(matches!(err, TransferError::InvalidDestination(_)));
    }
}

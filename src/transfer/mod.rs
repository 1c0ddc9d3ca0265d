//! Moving funds out of a recovered account
//!
//! The recovery core hands a [`ValidatedKey`] to a [`TransferExecutor`].
//! The shipped executor talks JSON-RPC to an Ethereum node (feature `http`);
//! the arithmetic and the transaction encoding are plain functions.

pub mod transaction;

#[cfg(feature = "http")]
pub mod rpc;

pub use transaction::{parse_address, LegacyTransaction, SignedTransaction};

#[cfg(feature = "http")]
pub use rpc::JsonRpcTransfer;

use primitive_types::U256;
use serde::Serialize;

use crate::errors::TransferError;

#[cfg(feature = "http")]
use crate::data_structures::ValidatedKey;

/// How much can be sent once fees and the retained minimum are covered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferPlan {
    pub balance: U256,
    pub gas_price: U256,
    pub gas_limit: u64,
    pub gas_cost: U256,
    pub retained: U256,
    pub amount: U256,
}

impl TransferPlan {
    /// `amount = balance - gas_price * gas_limit - min_balance`, which must be positive
    pub fn compute(
        balance: U256,
        gas_price: U256,
        gas_limit: u64,
        min_balance: U256,
    ) -> Result<Self, TransferError> {
        let required = gas_price
            .checked_mul(U256::from(gas_limit))
            .and_then(|gas_cost| gas_cost.checked_add(min_balance).map(|r| (gas_cost, r)));
        let Some((gas_cost, required)) = required else {
            return Err(TransferError::InsufficientFunds {
                balance,
                required: U256::MAX,
            });
        };

        if balance <= required {
            return Err(TransferError::InsufficientFunds { balance, required });
        }

        Ok(Self {
            balance,
            gas_price,
            gas_limit,
            gas_cost,
            retained: min_balance,
            amount: balance - required,
        })
    }
}

/// Confirmation of a mined transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    pub tx_hash: String,
    pub from: String,
    pub to: String,
    pub amount: U256,
    pub block_number: Option<u64>,
}

/// Sends everything above the retained minimum from `key` to `to`
#[cfg(feature = "http")]
#[async_trait::async_trait]
pub trait TransferExecutor: Send + Sync {
    async fn transfer(&self, key: &ValidatedKey, to: &str) -> Result<TransferReceipt, TransferError>;
}

/// Format wei as ETH with up to 18 decimals, trailing zeros trimmed
pub fn format_ether(wei: U256) -> String {
    let unit = U256::exp10(18);
    let whole = wei / unit;
    let fraction = wei % unit;
    if fraction.is_zero() {
        return format!("{whole}");
    }
    let digits = format!("{:0>18}", fraction.to_string());
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eth(n: u64) -> U256 {
        U256::exp10(18) * n
    }

    #[test]
    fn test_plan_subtracts_fees_and_minimum() {
        let min = U256::from(5_000_000_000_000_000u64);
        let gas_price = U256::from(10_000_000_000u64);
        let plan = TransferPlan::compute(eth(1), gas_price, 21_000, min).unwrap();
        assert_eq!(plan.gas_cost, U256::from(210_000_000_000_000u64));
        assert_eq!(
            plan.amount,
            eth(1) - U256::from(210_000_000_000_000u64) - min
        );
    }

    #[test]
    fn test_plan_rejects_non_positive_amount() {
        let min = U256::from(1000u64);
        // Exactly enough for fees and minimum leaves zero to send
        let err = TransferPlan::compute(U256::from(1021u64), U256::one(), 21, min).unwrap_err();
        assert!(matches!(err, TransferError::InsufficientFunds { .. }));

        let err = TransferPlan::compute(U256::zero(), U256::one(), 21_000, U256::zero()).unwrap_err();
        match err {
            TransferError::InsufficientFunds { balance, required } => {
                assert!(balance.is_zero());
                assert_eq!(required, U256::from(21_000u64));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_plan_overflow_is_insufficient() {
        let err = TransferPlan::compute(eth(1), U256::MAX, 2, U256::zero()).unwrap_err();
        assert!(matches!(err, TransferError::InsufficientFunds { .. }));
    }

    #[test]
    fn test_format_ether() {
        assert_eq!(format_ether(eth(2)), "2");
        assert_eq!(format_ether(U256::from(5_000_000_000_000_000u64)), "0.005");
        assert_eq!(format_ether(U256::from(1u64)), "0.000000000000000001");
    }
}

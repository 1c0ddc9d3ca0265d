//! Legacy Ethereum transactions signed with EIP-155 replay protection

use ethers::{
    core::types::{transaction::eip2718::TypedTransaction, Address, Bytes, TransactionRequest},
    signers::LocalWallet,
};
use primitive_types::U256;

use crate::{errors::TransferError, hex_utils::clean_hex, identity::keccak256};

/// Parse a 20-byte address with optional `0x`
pub fn parse_address(address: &str) -> Result<[u8; 20], TransferError> {
    let mut bytes = [0u8; 20];
    hex::decode_to_slice(clean_hex(address.trim()), &mut bytes)
        .map_err(|e| TransferError::InvalidDestination(format!("{address}: {e}")))?;
    Ok(bytes)
}

/// Pre-EIP-1559 value transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: U256,
    pub gas_price: U256,
    pub gas_limit: U256,
    pub to: [u8; 20],
    pub value: U256,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

/// Signed raw transaction ready for `eth_sendRawTransaction`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub raw: Vec<u8>,
    pub hash: [u8; 32],
}

impl SignedTransaction {
    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw))
    }

    pub fn hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.hash))
    }
}

impl LegacyTransaction {
    fn typed(&self) -> TypedTransaction {
        TransactionRequest::new()
            .nonce(self.nonce)
            .gas_price(self.gas_price)
            .gas(self.gas_limit)
            .to(Address::from(self.to))
            .value(self.value)
            .data(Bytes::from(self.data.clone()))
            .chain_id(self.chain_id)
            .into()
    }

    /// EIP-155 signing payload: the six fields plus (chain_id, 0, 0)
    pub fn signing_payload(&self) -> Vec<u8> {
        self.typed().rlp().to_vec()
    }

    pub fn signing_hash(&self) -> [u8; 32] {
        self.typed().sighash().0
    }

    /// Sign with `v = recovery_id + chain_id * 2 + 35`
    pub fn sign(&self, private_key: &[u8; 32]) -> Result<SignedTransaction, TransferError> {
        let wallet = LocalWallet::from_bytes(private_key)
            .map_err(|e| TransferError::Signing(e.to_string()))?;
        let tx = self.typed();
        let signature = wallet
            .sign_transaction_sync(&tx)
            .map_err(|e| TransferError::Signing(e.to_string()))?;

        let raw = tx.rlp_signed(&signature).to_vec();
        let hash = keccak256(&raw);
        Ok(SignedTransaction { raw, hash })
    }
}

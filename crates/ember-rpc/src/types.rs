//! Request and response types
//!
//! Quantities are `0x`-prefixed hexadecimal strings throughout, matching
//! the conventional txpool namespace encoding.

use std::collections::BTreeMap;

use bytes::Bytes;
use ember_metrics::MetricsSnapshot;
use ember_primitives::{Address, H256};
use ember_txpool::PooledTransaction;
use ember_types::{DynamicFeeTx, LegacyTx, SignedTransaction, TransactionBody, TxSignature};
use serde::{Deserialize, Serialize};

use crate::error::RpcError;

/// Tagged request accepted by the pool query surface
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum PoolRequest {
    /// Pending/queued counts
    #[serde(rename = "txpool_status")]
    Status,
    /// Full listing grouped by sender, then nonce
    #[serde(rename = "txpool_content")]
    Content,
    /// Compact one-line-per-entry listing
    #[serde(rename = "txpool_inspect")]
    Inspect,
    /// Pool metrics snapshot
    #[serde(rename = "txpool_metrics")]
    Metrics,
    /// Submit a pre-recovered transaction
    #[serde(rename = "txpool_submit")]
    Submit(RpcSubmission),
}

/// Tagged response returned by the pool query surface
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum PoolResponse {
    /// Pending/queued counts
    Status(StatusResponse),
    /// Full listing
    Content(ContentResponse),
    /// Compact listing
    Inspect(InspectResponse),
    /// Metrics snapshot
    Metrics(MetricsSnapshot),
    /// Content hash of an accepted submission
    Submitted(String),
}

/// `txpool_status` result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    /// Pending entry count, hex encoded
    pub pending: String,
    /// Queued entry count, hex encoded
    pub queued: String,
}

/// `txpool_content` result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentResponse {
    /// Pending entries: sender -> nonce -> transaction fields
    pub pending: BTreeMap<String, BTreeMap<String, RpcPoolTransaction>>,
    /// Queued entries, same grouping
    pub queued: BTreeMap<String, BTreeMap<String, RpcPoolTransaction>>,
}

/// `txpool_inspect` result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InspectResponse {
    /// Pending entries: sender -> nonce -> summary line
    pub pending: BTreeMap<String, BTreeMap<String, String>>,
    /// Queued entries, same grouping
    pub queued: BTreeMap<String, BTreeMap<String, String>>,
}

/// Transaction fields exposed by `txpool_content`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcPoolTransaction {
    /// Content hash
    pub hash: String,
    /// Nonce
    pub nonce: String,
    /// Sender address
    pub from: String,
    /// Destination (None for contract creation)
    pub to: Option<String>,
    /// Transferred value
    pub value: String,
    /// Gas limit
    pub gas: String,
    /// Input data
    pub input: String,
    /// Gas price (legacy) or effective gas price (dynamic fee)
    pub gas_price: String,
    /// Fee cap, dynamic-fee transactions only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<String>,
    /// Tip cap, dynamic-fee transactions only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<String>,
}

impl RpcPoolTransaction {
    /// Build the RPC view of a pooled transaction
    pub fn from_pooled(tx: &PooledTransaction) -> Self {
        let (max_fee, max_priority) = match &tx.tx.tx {
            TransactionBody::Legacy(_) => (None, None),
            TransactionBody::DynamicFee(body) => (
                Some(format_u128(body.max_fee_per_gas)),
                Some(format_u128(body.max_priority_fee_per_gas)),
            ),
        };
        Self {
            hash: tx.hash.to_hex(),
            nonce: format_u64(tx.nonce()),
            from: tx.sender.to_hex(),
            to: tx.tx.to().map(|to| to.to_hex()),
            value: format_u128(tx.tx.value()),
            gas: format_u64(tx.gas_limit()),
            input: format_bytes(tx.tx.data()),
            gas_price: format_u128(tx.effective_gas_price),
            max_fee_per_gas: max_fee,
            max_priority_fee_per_gas: max_priority,
        }
    }
}

/// A pre-recovered transaction submission.
///
/// The sender is `from`; recovering it from the signature is the
/// responsibility of the layer in front of this one. Quantities are hex
/// strings. Either `gasPrice` (legacy) or `maxFeePerGas` (dynamic fee)
/// selects the transaction type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcSubmission {
    /// Sender address
    pub from: String,
    /// Destination; absent for contract creation
    #[serde(default)]
    pub to: Option<String>,
    /// Nonce
    pub nonce: String,
    /// Gas limit
    pub gas: String,
    /// Transferred value; defaults to zero
    #[serde(default)]
    pub value: Option<String>,
    /// Input data; defaults to empty
    #[serde(default)]
    pub data: Option<String>,
    /// Legacy gas price
    #[serde(default)]
    pub gas_price: Option<String>,
    /// Dynamic-fee fee cap
    #[serde(default)]
    pub max_fee_per_gas: Option<String>,
    /// Dynamic-fee tip cap
    #[serde(default)]
    pub max_priority_fee_per_gas: Option<String>,
    /// Chain ID for dynamic-fee transactions
    #[serde(default)]
    pub chain_id: Option<String>,
    /// Signature v; defaults for dev submissions
    #[serde(default)]
    pub v: Option<String>,
    /// Signature r
    #[serde(default)]
    pub r: Option<String>,
    /// Signature s
    #[serde(default)]
    pub s: Option<String>,
}

impl RpcSubmission {
    /// Validate the submission into a signed transaction and its sender
    pub fn into_signed(self) -> Result<(SignedTransaction, Address), RpcError> {
        let sender = parse_address("from", &self.from)?;
        let to = match &self.to {
            Some(to) => Some(parse_address("to", to)?),
            None => None,
        };
        let nonce = parse_u64("nonce", &self.nonce)?;
        let gas_limit = parse_u64("gas", &self.gas)?;
        let value = match &self.value {
            Some(value) => parse_u128("value", value)?,
            None => 0,
        };
        let data = match &self.data {
            Some(data) => Bytes::from(parse_bytes("data", data)?),
            None => Bytes::new(),
        };
        let signature = self.parse_signature()?;

        let tx = match (&self.gas_price, &self.max_fee_per_gas) {
            (Some(gas_price), None) => SignedTransaction::new_legacy(
                LegacyTx {
                    nonce,
                    gas_price: parse_u128("gasPrice", gas_price)?,
                    gas_limit,
                    to,
                    value,
                    data,
                },
                signature,
            ),
            (None, Some(fee_cap)) => {
                let tip_cap = self
                    .max_priority_fee_per_gas
                    .as_deref()
                    .map(|tip| parse_u128("maxPriorityFeePerGas", tip))
                    .transpose()?
                    .unwrap_or(0);
                let chain_id = self
                    .chain_id
                    .as_deref()
                    .map(|id| parse_u64("chainId", id))
                    .transpose()?
                    .unwrap_or(1);
                SignedTransaction::new_dynamic_fee(
                    DynamicFeeTx {
                        chain_id,
                        nonce,
                        max_priority_fee_per_gas: tip_cap,
                        max_fee_per_gas: parse_u128("maxFeePerGas", fee_cap)?,
                        gas_limit,
                        to,
                        value,
                        data,
                        access_list: vec![],
                    },
                    signature,
                )
            }
            (Some(_), Some(_)) => {
                return Err(RpcError::invalid_params(
                    "both gasPrice and maxFeePerGas given",
                ))
            }
            (None, None) => {
                return Err(RpcError::invalid_params(
                    "one of gasPrice or maxFeePerGas is required",
                ))
            }
        };

        Ok((tx, sender))
    }

    fn parse_signature(&self) -> Result<TxSignature, RpcError> {
        let v = self
            .v
            .as_deref()
            .map(|v| parse_u64("v", v))
            .transpose()?
            .unwrap_or(27);
        let r = match &self.r {
            Some(r) => parse_h256("r", r)?,
            None => H256::from_bytes([1u8; 32]),
        };
        let s = match &self.s {
            Some(s) => parse_h256("s", s)?,
            None => H256::from_bytes([2u8; 32]),
        };
        Ok(TxSignature::new(v, r, s))
    }
}

/// Parse an address field
pub fn parse_address(field: &str, value: &str) -> Result<Address, RpcError> {
    Address::from_hex(value)
        .map_err(|e| RpcError::invalid_params(format!("invalid {}: {}", field, e)))
}

/// Parse a 32-byte hash field
pub fn parse_h256(field: &str, value: &str) -> Result<H256, RpcError> {
    H256::from_hex(value).map_err(|e| RpcError::invalid_params(format!("invalid {}: {}", field, e)))
}

/// Parse a hex quantity into u64
pub fn parse_u64(field: &str, value: &str) -> Result<u64, RpcError> {
    let raw = value.strip_prefix("0x").unwrap_or(value);
    u64::from_str_radix(raw, 16)
        .map_err(|e| RpcError::invalid_params(format!("invalid {}: {}", field, e)))
}

/// Parse a hex quantity into u128
pub fn parse_u128(field: &str, value: &str) -> Result<u128, RpcError> {
    let raw = value.strip_prefix("0x").unwrap_or(value);
    u128::from_str_radix(raw, 16)
        .map_err(|e| RpcError::invalid_params(format!("invalid {}: {}", field, e)))
}

/// Parse hex-encoded bytes
pub fn parse_bytes(field: &str, value: &str) -> Result<Vec<u8>, RpcError> {
    let raw = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(raw).map_err(|e| RpcError::invalid_params(format!("invalid {}: {}", field, e)))
}

/// Format u64 as hex quantity
pub fn format_u64(value: u64) -> String {
    format!("0x{:x}", value)
}

/// Format u128 as hex quantity
pub fn format_u128(value: u128) -> String {
    format!("0x{:x}", value)
}

/// Format bytes as hex string
pub fn format_bytes(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

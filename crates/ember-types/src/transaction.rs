//! Transaction types for EmberLedger

use bytes::Bytes;
use ember_primitives::{Address, H256};
use sha3::{Digest, Keccak256};

/// Base gas charged for any transaction
pub const TX_BASE_GAS: u64 = 21000;

/// Additional gas charged for contract creation
pub const TX_CREATE_GAS: u64 = 32000;

/// Gas per zero byte of payload
pub const DATA_ZERO_GAS: u64 = 4;

/// Gas per non-zero byte of payload
pub const DATA_NONZERO_GAS: u64 = 16;

/// Transaction type identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TxType {
    /// Legacy transaction (pre-EIP-2718)
    #[default]
    Legacy = 0,
    /// EIP-1559 dynamic fee transaction
    DynamicFee = 2,
}

/// Legacy transaction (Type 0)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyTx {
    /// Transaction nonce
    pub nonce: u64,
    /// Gas price in wei
    pub gas_price: u128,
    /// Gas limit
    pub gas_limit: u64,
    /// Recipient address (None for contract creation)
    pub to: Option<Address>,
    /// Value to transfer in wei
    pub value: u128,
    /// Input data
    pub data: Bytes,
}

/// EIP-1559 dynamic fee transaction (Type 2)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynamicFeeTx {
    /// Chain ID
    pub chain_id: u64,
    /// Transaction nonce
    pub nonce: u64,
    /// Max priority fee per gas (tip)
    pub max_priority_fee_per_gas: u128,
    /// Max fee per gas
    pub max_fee_per_gas: u128,
    /// Gas limit
    pub gas_limit: u64,
    /// Recipient address (None for contract creation)
    pub to: Option<Address>,
    /// Value to transfer in wei
    pub value: u128,
    /// Input data
    pub data: Bytes,
    /// Access list
    pub access_list: Vec<AccessListItem>,
}

/// Access list item (address + storage keys)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessListItem {
    /// Account address
    pub address: Address,
    /// Storage keys
    pub storage_keys: Vec<H256>,
}

/// Signature components
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxSignature {
    /// Recovery ID (v value)
    pub v: u64,
    /// R component
    pub r: H256,
    /// S component
    pub s: H256,
}

impl TxSignature {
    /// Create a new signature
    pub fn new(v: u64, r: H256, s: H256) -> Self {
        Self { v, r, s }
    }

    /// Check if signature is well-formed (non-zero r and s)
    pub fn is_valid(&self) -> bool {
        !self.r.is_zero() && !self.s.is_zero()
    }
}

/// Transaction body (unsigned)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionBody {
    /// Legacy transaction
    Legacy(LegacyTx),
    /// EIP-1559 transaction
    DynamicFee(DynamicFeeTx),
}

/// Signed transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Transaction type
    pub tx_type: TxType,
    /// Transaction body
    pub tx: TransactionBody,
    /// Signature
    pub signature: TxSignature,
}

impl SignedTransaction {
    /// Create a new signed legacy transaction
    pub fn new_legacy(tx: LegacyTx, signature: TxSignature) -> Self {
        Self {
            tx_type: TxType::Legacy,
            tx: TransactionBody::Legacy(tx),
            signature,
        }
    }

    /// Create a new signed EIP-1559 transaction
    pub fn new_dynamic_fee(tx: DynamicFeeTx, signature: TxSignature) -> Self {
        Self {
            tx_type: TxType::DynamicFee,
            tx: TransactionBody::DynamicFee(tx),
            signature,
        }
    }

    /// Get transaction nonce
    pub fn nonce(&self) -> u64 {
        match &self.tx {
            TransactionBody::Legacy(tx) => tx.nonce,
            TransactionBody::DynamicFee(tx) => tx.nonce,
        }
    }

    /// Get gas limit
    pub fn gas_limit(&self) -> u64 {
        match &self.tx {
            TransactionBody::Legacy(tx) => tx.gas_limit,
            TransactionBody::DynamicFee(tx) => tx.gas_limit,
        }
    }

    /// Get recipient address
    pub fn to(&self) -> Option<&Address> {
        match &self.tx {
            TransactionBody::Legacy(tx) => tx.to.as_ref(),
            TransactionBody::DynamicFee(tx) => tx.to.as_ref(),
        }
    }

    /// Get transfer value
    pub fn value(&self) -> u128 {
        match &self.tx {
            TransactionBody::Legacy(tx) => tx.value,
            TransactionBody::DynamicFee(tx) => tx.value,
        }
    }

    /// Get input data
    pub fn data(&self) -> &Bytes {
        match &self.tx {
            TransactionBody::Legacy(tx) => &tx.data,
            TransactionBody::DynamicFee(tx) => &tx.data,
        }
    }

    /// Check if this is a contract creation transaction
    pub fn is_contract_creation(&self) -> bool {
        self.to().is_none()
    }

    /// Maximum fee per gas the sender is willing to pay.
    ///
    /// Legacy transactions bid a single gas price, which acts as both
    /// the fee cap and the tip cap.
    pub fn max_fee_per_gas(&self) -> u128 {
        match &self.tx {
            TransactionBody::Legacy(tx) => tx.gas_price,
            TransactionBody::DynamicFee(tx) => tx.max_fee_per_gas,
        }
    }

    /// Maximum priority fee per gas (tip cap)
    pub fn max_priority_fee_per_gas(&self) -> u128 {
        match &self.tx {
            TransactionBody::Legacy(tx) => tx.gas_price,
            TransactionBody::DynamicFee(tx) => tx.max_priority_fee_per_gas,
        }
    }

    /// Get effective gas price for the given base fee
    ///
    /// Returns `None` if `base_fee > max_fee_per_gas` for EIP-1559 transactions
    /// (transaction cannot be included in a block with this base fee).
    pub fn effective_gas_price(&self, base_fee: u128) -> Option<u128> {
        match &self.tx {
            TransactionBody::Legacy(tx) => Some(tx.gas_price),
            TransactionBody::DynamicFee(tx) => {
                if base_fee > tx.max_fee_per_gas {
                    return None;
                }
                let priority_fee = tx.max_priority_fee_per_gas.min(tx.max_fee_per_gas - base_fee);
                Some(base_fee + priority_fee)
            }
        }
    }

    /// Priority the transaction pays above the given base fee.
    ///
    /// `min(tip_cap, fee_cap - base_fee)` for dynamic-fee transactions,
    /// `gas_price - base_fee` for legacy. Saturates at zero.
    pub fn effective_priority(&self, base_fee: u128) -> u128 {
        match &self.tx {
            TransactionBody::Legacy(tx) => tx.gas_price.saturating_sub(base_fee),
            TransactionBody::DynamicFee(tx) => tx
                .max_priority_fee_per_gas
                .min(tx.max_fee_per_gas.saturating_sub(base_fee)),
        }
    }

    /// Worst-case cost of the transaction: value plus gas limit priced
    /// at the fee cap. The sender balance must cover this at admission.
    pub fn max_cost(&self) -> u128 {
        self.value()
            .saturating_add((self.gas_limit() as u128).saturating_mul(self.max_fee_per_gas()))
    }

    /// Minimum gas the transaction shape requires regardless of execution:
    /// base cost, payload byte costs and the contract-creation surcharge.
    pub fn intrinsic_gas(&self) -> u64 {
        let mut gas = TX_BASE_GAS;
        if self.is_contract_creation() {
            gas += TX_CREATE_GAS;
        }
        for byte in self.data().iter() {
            gas += if *byte == 0 { DATA_ZERO_GAS } else { DATA_NONZERO_GAS };
        }
        gas
    }

    /// Content hash identifying the transaction.
    ///
    /// Keccak-256 over a tag-prefixed field encoding. Identity only;
    /// this is not a consensus wire format.
    pub fn content_hash(&self) -> H256 {
        let mut hasher = Keccak256::new();
        hasher.update([self.tx_type as u8]);
        match &self.tx {
            TransactionBody::Legacy(tx) => {
                hasher.update(tx.nonce.to_be_bytes());
                hasher.update(tx.gas_price.to_be_bytes());
                hasher.update(tx.gas_limit.to_be_bytes());
                hash_to_field(&mut hasher, tx.to.as_ref());
                hasher.update(tx.value.to_be_bytes());
                hasher.update((tx.data.len() as u64).to_be_bytes());
                hasher.update(&tx.data);
            }
            TransactionBody::DynamicFee(tx) => {
                hasher.update(tx.chain_id.to_be_bytes());
                hasher.update(tx.nonce.to_be_bytes());
                hasher.update(tx.max_priority_fee_per_gas.to_be_bytes());
                hasher.update(tx.max_fee_per_gas.to_be_bytes());
                hasher.update(tx.gas_limit.to_be_bytes());
                hash_to_field(&mut hasher, tx.to.as_ref());
                hasher.update(tx.value.to_be_bytes());
                hasher.update((tx.data.len() as u64).to_be_bytes());
                hasher.update(&tx.data);
                for item in &tx.access_list {
                    hasher.update(item.address.as_bytes());
                    for key in &item.storage_keys {
                        hasher.update(key.as_bytes());
                    }
                }
            }
        }
        hasher.update(self.signature.v.to_be_bytes());
        hasher.update(self.signature.r.as_bytes());
        hasher.update(self.signature.s.as_bytes());
        H256::from_bytes(hasher.finalize().into())
    }
}

fn hash_to_field(hasher: &mut Keccak256, to: Option<&Address>) {
    match to {
        Some(addr) => {
            hasher.update([1u8]);
            hasher.update(addr.as_bytes());
        }
        None => hasher.update([0u8]),
    }
}

impl Default for LegacyTx {
    fn default() -> Self {
        Self {
            nonce: 0,
            gas_price: 0,
            gas_limit: TX_BASE_GAS,
            to: None,
            value: 0,
            data: Bytes::new(),
        }
    }
}

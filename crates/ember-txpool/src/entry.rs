//! Pooled transaction entry

use std::time::Instant;

use ember_primitives::{Address, H256};
use ember_types::SignedTransaction;

/// Transaction with pool metadata
#[derive(Clone, Debug)]
pub struct PooledTransaction {
    /// The signed transaction
    pub tx: SignedTransaction,
    /// Recovered sender address
    pub sender: Address,
    /// Transaction content hash
    pub hash: H256,
    /// Effective gas price at the base fee seen on admission
    pub effective_gas_price: u128,
    /// When the entry entered the pool; refreshed on replacement
    pub added_at: Instant,
    /// Pool-wide insertion sequence number; refreshed on replacement.
    /// Deterministic first-seen order for tie-breaking where wall-clock
    /// timestamps can collide.
    pub seq: u64,
}

impl PooledTransaction {
    /// Get nonce
    pub fn nonce(&self) -> u64 {
        self.tx.nonce()
    }

    /// Get gas limit
    pub fn gas_limit(&self) -> u64 {
        self.tx.gas_limit()
    }

    /// Priority paid above the given base fee
    pub fn effective_priority(&self, base_fee: u128) -> u128 {
        self.tx.effective_priority(base_fee)
    }

    /// One-line human summary: destination plus value/gas shorthand.
    /// Used by the inspect view.
    pub fn summary(&self) -> String {
        let dest = match self.tx.to() {
            Some(to) => to.to_hex(),
            None => "contract creation".to_string(),
        };
        format!(
            "{}: {} wei + {} gas x {} wei",
            dest,
            self.tx.value(),
            self.tx.gas_limit(),
            self.effective_gas_price
        )
    }
}

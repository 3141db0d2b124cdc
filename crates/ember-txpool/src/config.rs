//! Pool configuration

use std::time::Duration;

/// Pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of transactions in the pool (pending + queued)
    pub max_total: usize,
    /// Maximum transactions per account
    pub max_per_account: usize,
    /// Block gas limit
    pub block_gas_limit: u64,
    /// Minimum effective gas price accepted into the pool
    pub min_gas_price: u128,
    /// Base fee (for EIP-1559) at startup; updated per block
    pub base_fee: u128,
    /// Minimum fee bump, in percent, a replacement must pay over the
    /// transaction it displaces. Applied to the fee cap and the tip cap
    /// independently; an equal fee never qualifies.
    pub price_bump_percent: u128,
    /// How long a queued (nonce-gapped) transaction may wait before the
    /// expiry sweep removes it
    pub queued_lifetime: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_total: 5120,
            max_per_account: 16,
            block_gas_limit: 30_000_000,
            min_gas_price: 1_000_000_000, // 1 gwei
            base_fee: 0,
            price_bump_percent: 10,
            queued_lifetime: Duration::from_secs(3 * 3600),
        }
    }
}

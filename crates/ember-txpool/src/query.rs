//! Read-only snapshot views
//!
//! Each view takes one account read lock at a time, so an entry is never
//! observed mid-mutation: a sender's listing is always a consistent
//! snapshot of that sender's state.

use std::collections::BTreeMap;

use ember_primitives::Address;

use crate::entry::PooledTransaction;
use crate::pool::TxPool;

/// Counts of pending and queued entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Entries ready for inclusion
    pub pending: usize,
    /// Entries blocked behind a nonce gap
    pub queued: usize,
}

/// Full listing grouped by sender, then nonce
#[derive(Debug, Clone, Default)]
pub struct PoolContent {
    /// Pending entries
    pub pending: BTreeMap<Address, BTreeMap<u64, PooledTransaction>>,
    /// Queued entries
    pub queued: BTreeMap<Address, BTreeMap<u64, PooledTransaction>>,
}

/// Compact listing: one summary line per entry
#[derive(Debug, Clone, Default)]
pub struct PoolInspect {
    /// Pending entries
    pub pending: BTreeMap<Address, BTreeMap<u64, String>>,
    /// Queued entries
    pub queued: BTreeMap<Address, BTreeMap<u64, String>>,
}

impl TxPool {
    /// Pending/queued counts
    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            pending: self.pending_len(),
            queued: self.queued_len(),
        }
    }

    /// Full transaction listing grouped by sender and nonce
    pub fn content(&self) -> PoolContent {
        let mut content = PoolContent::default();
        for entry in self.by_sender.iter() {
            let account = entry.value().read();
            if !account.pending.is_empty() {
                content.pending.insert(*entry.key(), account.pending.clone());
            }
            if !account.queued.is_empty() {
                content.queued.insert(*entry.key(), account.queued.clone());
            }
        }
        content
    }

    /// Compact listing with one summary string per entry
    pub fn inspect(&self) -> PoolInspect {
        let mut inspect = PoolInspect::default();
        for entry in self.by_sender.iter() {
            let account = entry.value().read();
            if !account.pending.is_empty() {
                inspect
                    .pending
                    .insert(*entry.key(), summarize(&account.pending));
            }
            if !account.queued.is_empty() {
                inspect
                    .queued
                    .insert(*entry.key(), summarize(&account.queued));
            }
        }
        inspect
    }
}

fn summarize(txs: &BTreeMap<u64, PooledTransaction>) -> BTreeMap<u64, String> {
    txs.iter().map(|(n, tx)| (*n, tx.summary())).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::PoolConfig;
    use crate::state::MemoryState;
    use crate::test_util::{legacy_tx, legacy_tx_to, sender_a, sender_b, GWEI};

    fn pool() -> TxPool {
        let state = Arc::new(MemoryState::new());
        state.set_account(sender_a(), 0, u128::MAX);
        state.set_account(sender_b(), 0, u128::MAX);
        TxPool::new(PoolConfig::default(), state)
    }

    #[test]
    fn test_empty_pool_views() {
        let pool = pool();
        let status = pool.status();
        assert_eq!(status.pending, 0);
        assert_eq!(status.queued, 0);

        let content = pool.content();
        assert!(content.pending.is_empty());
        assert!(content.queued.is_empty());

        let inspect = pool.inspect();
        assert!(inspect.pending.is_empty());
        assert!(inspect.queued.is_empty());
    }

    #[test]
    fn test_content_groups_by_sender_and_nonce() {
        let pool = pool();
        pool.add(legacy_tx(0, 10 * GWEI), sender_a()).unwrap();
        pool.add(legacy_tx(1, 10 * GWEI), sender_a()).unwrap();
        pool.add(legacy_tx(3, 10 * GWEI), sender_b()).unwrap();

        let content = pool.content();
        assert_eq!(content.pending.len(), 1);
        let a_pending = &content.pending[&sender_a()];
        assert_eq!(
            a_pending.keys().copied().collect::<Vec<_>>(),
            vec![0, 1]
        );
        assert_eq!(content.queued.len(), 1);
        assert!(content.queued[&sender_b()].contains_key(&3));
    }

    #[test]
    fn test_inspect_summaries_carry_destination() {
        let pool = pool();
        pool.add(legacy_tx_to(0, 10 * GWEI, 0x77), sender_a()).unwrap();

        let inspect = pool.inspect();
        let summary = &inspect.pending[&sender_a()][&0];
        assert!(summary.contains(&ember_primitives::Address::from_bytes([0x77; 20]).to_hex()));
        assert!(summary.contains("gas"));
    }

    #[test]
    fn test_views_reflect_promotion() {
        let pool = pool();
        pool.add(legacy_tx(2, 10 * GWEI), sender_a()).unwrap();
        assert!(pool.content().pending.is_empty());

        pool.add(legacy_tx(0, 10 * GWEI), sender_a()).unwrap();
        pool.add(legacy_tx(1, 10 * GWEI), sender_a()).unwrap();

        let content = pool.content();
        assert!(content.queued.is_empty());
        assert_eq!(content.pending[&sender_a()].len(), 3);
    }
}

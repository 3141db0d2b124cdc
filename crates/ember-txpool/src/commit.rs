//! Block commit handling
//!
//! Candidate selection never mutates the pool; entries leave it only
//! when the block producer reports what actually happened to them. A
//! failed commit therefore loses nothing: the producer simply never
//! reports, and every candidate is offered again for the next block.

use std::collections::BTreeMap;

use ember_primitives::{Address, H256};
use tracing::debug;

use crate::pool::TxPool;

/// Per-transaction result reported by the block producer after a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxDisposition {
    /// Executed and included in the committed block
    Included,
    /// Included but execution reverted; the nonce was still consumed
    Reverted,
    /// Left out of the block. `retriable` distinguishes environment
    /// failures, which keep the entry pooled for the next block, from
    /// deterministic invalidity, which drops it permanently.
    Rejected {
        /// Whether the entry should stay in the pool
        retriable: bool,
    },
}

impl TxPool {
    /// Apply the per-transaction results of a committed block.
    ///
    /// Included and reverted transactions consumed their nonces: their
    /// entries are removed and the sender's cached nonce advances past
    /// them, which also purges any other entry at a consumed nonce.
    /// Non-retriable rejections are dropped. Each touched sender is then
    /// re-promoted, moving gap-filled queued entries into pending.
    pub fn apply_block_outcome(&self, results: &[(H256, TxDisposition)]) {
        let mut per_sender: BTreeMap<Address, Vec<(u64, H256, TxDisposition)>> = BTreeMap::new();
        for (hash, disposition) in results {
            let Some(entry) = self.by_hash.get(hash) else {
                debug!(hash = %hash, "commit result for unknown transaction");
                continue;
            };
            per_sender
                .entry(entry.sender)
                .or_default()
                .push((entry.nonce(), *hash, *disposition));
        }

        for (sender, txs) in per_sender {
            let Some(account_entry) = self.by_sender.get(&sender) else {
                continue;
            };
            let mut account = account_entry.write();

            let mut consumed: Option<u64> = None;
            for (nonce, hash, disposition) in txs {
                match disposition {
                    TxDisposition::Included | TxDisposition::Reverted => {
                        consumed = Some(consumed.map_or(nonce, |c| c.max(nonce)));
                    }
                    TxDisposition::Rejected { retriable: false } => {
                        let occupant = account
                            .pending
                            .get(&nonce)
                            .or_else(|| account.queued.get(&nonce))
                            .map(|t| t.hash);
                        if occupant == Some(hash) {
                            debug!(sender = %sender, nonce, hash = %hash, "dropping invalid transaction");
                            self.remove_at(&mut account, nonce);
                        }
                    }
                    TxDisposition::Rejected { retriable: true } => {
                        debug!(sender = %sender, nonce, hash = %hash, "keeping transaction for resubmission");
                    }
                }
            }

            if let Some(max_consumed) = consumed {
                self.advance_nonce(&mut account, max_consumed + 1);
            }
            self.promote(&mut account);
        }
        self.update_gauges();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::PoolConfig;
    use crate::state::MemoryState;
    use crate::test_util::{legacy_tx, sender_a, sender_b, GWEI};

    fn pool() -> TxPool {
        let state = Arc::new(MemoryState::new());
        state.set_account(sender_a(), 0, u128::MAX);
        state.set_account(sender_b(), 0, u128::MAX);
        TxPool::new(PoolConfig::default(), state)
    }

    #[test]
    fn test_included_removes_and_advances() {
        let pool = pool();
        let h0 = pool.add(legacy_tx(0, 10 * GWEI), sender_a()).unwrap();
        let h1 = pool.add(legacy_tx(1, 10 * GWEI), sender_a()).unwrap();

        pool.apply_block_outcome(&[
            (h0, TxDisposition::Included),
            (h1, TxDisposition::Included),
        ]);

        assert!(pool.is_empty());
    }

    #[test]
    fn test_reverted_consumes_nonce() {
        let pool = pool();
        let h0 = pool.add(legacy_tx(0, 10 * GWEI), sender_a()).unwrap();
        let h1 = pool.add(legacy_tx(1, 10 * GWEI), sender_a()).unwrap();

        pool.apply_block_outcome(&[
            (h0, TxDisposition::Reverted),
            (h1, TxDisposition::Included),
        ]);

        assert!(pool.is_empty());
    }

    #[test]
    fn test_commit_gap_fill_promotes_queued() {
        let pool = pool();
        let h0 = pool.add(legacy_tx(0, 10 * GWEI), sender_a()).unwrap();
        let h1 = pool.add(legacy_tx(1, 10 * GWEI), sender_a()).unwrap();
        let h3 = pool.add(legacy_tx(3, 10 * GWEI), sender_a()).unwrap();
        assert_eq!(pool.queued_len(), 1);

        pool.apply_block_outcome(&[
            (h0, TxDisposition::Included),
            (h1, TxDisposition::Included),
        ]);
        // nonce 3 still gapped behind the missing nonce 2
        assert_eq!(pool.queued_len(), 1);

        // nonce 2 was consumed via a block from another node
        pool.set_nonce(&sender_a(), 3);

        assert_eq!(pool.pending_len(), 1);
        assert_eq!(pool.queued_len(), 0);
        assert!(pool.get_by_hash(&h3).is_some());
    }

    #[test]
    fn test_deterministic_rejection_drops_and_demotes() {
        let pool = pool();
        let h0 = pool.add(legacy_tx(0, 10 * GWEI), sender_a()).unwrap();
        let h1 = pool.add(legacy_tx(1, 10 * GWEI), sender_a()).unwrap();
        let h2 = pool.add(legacy_tx(2, 10 * GWEI), sender_a()).unwrap();

        // nonce 0 landed; nonce 1 is deterministically invalid
        pool.apply_block_outcome(&[
            (h0, TxDisposition::Included),
            (h1, TxDisposition::Rejected { retriable: false }),
        ]);

        assert!(pool.get_by_hash(&h1).is_none());
        // nonce 2 is gapped behind the dropped entry
        assert_eq!(pool.pending_len(), 0);
        assert_eq!(pool.queued_len(), 1);
        assert!(pool.get_by_hash(&h2).is_some());
    }

    #[test]
    fn test_environment_rejection_requeues_unchanged() {
        let pool = pool();
        let h0 = pool.add(legacy_tx(0, 10 * GWEI), sender_a()).unwrap();

        pool.apply_block_outcome(&[(h0, TxDisposition::Rejected { retriable: true })]);

        // still pending, ready for the next block
        assert_eq!(pool.pending_len(), 1);
        assert!(pool.get_by_hash(&h0).is_some());
    }

    #[test]
    fn test_commit_touches_only_reported_senders() {
        let pool = pool();
        let ha = pool.add(legacy_tx(0, 10 * GWEI), sender_a()).unwrap();
        let hb = pool.add(legacy_tx(0, 10 * GWEI), sender_b()).unwrap();

        pool.apply_block_outcome(&[(ha, TxDisposition::Included)]);

        assert!(pool.get_by_hash(&ha).is_none());
        assert!(pool.get_by_hash(&hb).is_some());
    }

    #[test]
    fn test_commit_unknown_hash_is_ignored(){
        let pool = pool();
        pool.add(legacy_tx(0, 10 * GWEI), sender_a()).unwrap();

        pool.apply_block_outcome(&[(
            ember_primitives::H256::from_bytes([9u8; 32]),
            TxDisposition::Included,
        )]);

        assert_eq!(pool.len(), 1);
    }
}

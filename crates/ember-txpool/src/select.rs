//! Block candidate selection
//!
//! Merges the per-sender pending runs into one deterministic sequence:
//! effective priority descending, insertion order ascending, content
//! hash ascending. A sender's transactions are only ever offered in
//! nonce order; nonce k+1 enters the merge once k has been taken.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use ember_primitives::H256;

use crate::entry::PooledTransaction;
use crate::pool::TxPool;

/// Head of one sender's pending run, ranked for the merge
struct Candidate {
    priority: u128,
    seq: u64,
    hash: H256,
    run: usize,
}

impl Candidate {
    fn new(tx: &PooledTransaction, base_fee: u128, run: usize) -> Option<Self> {
        // a transaction whose fee cap cannot cover the base fee is not
        // includable, and neither is anything behind it
        tx.tx.effective_gas_price(base_fee)?;
        Some(Self {
            priority: tx.effective_priority(base_fee),
            seq: tx.seq,
            hash: tx.hash,
            run,
        })
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // max-heap: higher priority wins, then first-seen, then the
        // lexicographically smaller hash
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
            .then_with(|| other.hash.cmp(&self.hash))
    }
}

impl TxPool {
    /// Pending transactions in the order a block producer should attempt
    /// them, at most `limit` entries.
    ///
    /// Selection reads a consistent snapshot of each sender's pending run
    /// and does not mutate the pool; entries are removed only when the
    /// producer reports a commit via
    /// [`apply_block_outcome`](TxPool::apply_block_outcome).
    pub fn best_transactions(&self, limit: usize) -> Vec<PooledTransaction> {
        if limit == 0 {
            return Vec::new();
        }
        let base_fee = self.base_fee();

        let mut runs: Vec<VecDeque<PooledTransaction>> = Vec::new();
        for entry in self.by_sender.iter() {
            let account = entry.value().read();
            if !account.pending.is_empty() {
                runs.push(account.pending.values().cloned().collect());
            }
        }

        let mut heap = BinaryHeap::new();
        for (idx, run) in runs.iter().enumerate() {
            if let Some(candidate) = run.front().and_then(|tx| Candidate::new(tx, base_fee, idx)) {
                heap.push(candidate);
            }
        }

        let mut selected = Vec::with_capacity(limit.min(self.pending_len()));
        while let Some(candidate) = heap.pop() {
            let run = &mut runs[candidate.run];
            if let Some(tx) = run.pop_front() {
                selected.push(tx);
            }
            if selected.len() == limit {
                break;
            }
            if let Some(next) = run.front().and_then(|tx| Candidate::new(tx, base_fee, candidate.run)) {
                heap.push(next);
            }
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::PoolConfig;
    use crate::state::MemoryState;
    use crate::test_util::{dynamic_tx, legacy_tx, sender_a, sender_b, GWEI};
    use ember_primitives::Address;

    fn pool_with_base_fee(base_fee: u128) -> TxPool {
        let state = Arc::new(MemoryState::new());
        for i in 1..=4u8 {
            state.set_account(Address::from_bytes([i * 0x11; 20]), 0, u128::MAX);
        }
        let config = PoolConfig {
            base_fee,
            ..Default::default()
        };
        TxPool::new(config, state)
    }

    #[test]
    fn test_orders_by_priority_descending() {
        let pool = pool_with_base_fee(0);
        pool.add(legacy_tx(0, 5 * GWEI), sender_a()).unwrap();
        pool.add(legacy_tx(0, 15 * GWEI), sender_b()).unwrap();

        let best = pool.best_transactions(10);
        assert_eq!(best.len(), 2);
        assert_eq!(best[0].sender, sender_b());
        assert_eq!(best[1].sender, sender_a());
    }

    #[test]
    fn test_sender_stays_in_nonce_order() {
        let pool = pool_with_base_fee(0);
        // the higher nonce pays more but must not be offered first
        pool.add(legacy_tx(0, 5 * GWEI), sender_a()).unwrap();
        pool.add(legacy_tx(1, 50 * GWEI), sender_a()).unwrap();
        pool.add(legacy_tx(0, 10 * GWEI), sender_b()).unwrap();

        let best = pool.best_transactions(10);
        let nonces: Vec<(Address, u64)> = best.iter().map(|tx| (tx.sender, tx.nonce())).collect();

        let a0 = nonces.iter().position(|&(s, n)| s == sender_a() && n == 0).unwrap();
        let a1 = nonces.iter().position(|&(s, n)| s == sender_a() && n == 1).unwrap();
        assert!(a0 < a1);
        // sender_b outbids sender_a's head
        assert_eq!(best[0].sender, sender_b());
    }

    #[test]
    fn test_queued_entries_are_not_selected() {
        let pool = pool_with_base_fee(0);
        pool.add(legacy_tx(0, 10 * GWEI), sender_a()).unwrap();
        pool.add(legacy_tx(5, 50 * GWEI), sender_a()).unwrap();

        let best = pool.best_transactions(10);
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].nonce(), 0);
    }

    #[test]
    fn test_fee_tie_broken_by_first_seen() {
        let pool = pool_with_base_fee(0);
        let first = pool.add(legacy_tx(0, 10 * GWEI), sender_a()).unwrap();
        pool.add(legacy_tx(0, 10 * GWEI), sender_b()).unwrap();

        let best = pool.best_transactions(10);
        assert_eq!(best[0].hash, first);
    }

    #[test]
    fn test_limit_is_respected() {
        let pool = pool_with_base_fee(0);
        for nonce in 0..5 {
            pool.add(legacy_tx(nonce, 10 * GWEI), sender_a()).unwrap();
        }

        assert_eq!(pool.best_transactions(3).len(), 3);
        assert!(pool.best_transactions(0).is_empty());
    }

    #[test]
    fn test_dynamic_priority_uses_base_fee() {
        let pool = pool_with_base_fee(10 * GWEI);
        // tip 5, cap 30 -> priority 5
        pool.add(dynamic_tx(0, 5 * GWEI, 30 * GWEI), sender_a()).unwrap();
        // tip 20, cap 12 -> priority min(20, 12-10) = 2
        pool.add(dynamic_tx(0, 20 * GWEI, 12 * GWEI), sender_b()).unwrap();

        let best = pool.best_transactions(10);
        assert_eq!(best[0].sender, sender_a());
    }

    #[test]
    fn test_unincludable_head_blocks_whole_run() {
        let pool = pool_with_base_fee(0);
        pool.add(dynamic_tx(0, GWEI, 2 * GWEI), sender_a()).unwrap();
        pool.add(dynamic_tx(1, 30 * GWEI, 30 * GWEI), sender_a()).unwrap();
        pool.add(legacy_tx(0, 10 * GWEI), sender_b()).unwrap();

        // base fee rises above sender_a's head fee cap
        pool.set_base_fee(5 * GWEI);

        let best = pool.best_transactions(10);
        // nonce 1 must not jump its unincludable predecessor
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].sender, sender_b());
    }

    #[test]
    fn test_selection_does_not_mutate_pool() {
        let pool = pool_with_base_fee(0);
        pool.add(legacy_tx(0, 10 * GWEI), sender_a()).unwrap();
        pool.add(legacy_tx(1, 10 * GWEI), sender_a()).unwrap();

        let first = pool.best_transactions(10);
        let second = pool.best_transactions(10);

        assert_eq!(pool.pending_len(), 2);
        assert_eq!(
            first.iter().map(|t| t.hash).collect::<Vec<_>>(),
            second.iter().map(|t| t.hash).collect::<Vec<_>>()
        );
    }
}

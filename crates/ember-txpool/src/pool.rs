//! Transaction pool implementation

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use ember_metrics::Metrics;
use ember_primitives::{Address, H256};
use ember_types::SignedTransaction;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::config::PoolConfig;
use crate::entry::PooledTransaction;
use crate::error::{TxPoolError, TxPoolResult};
use crate::state::AccountStateProvider;
use crate::validate;

/// Metric names exported by the pool
pub mod metric {
    /// Admissions of fresh transactions
    pub const ACCEPTED: &str = "txpool.accepted";
    /// Successful same-slot replacements
    pub const REPLACED: &str = "txpool.replaced";
    /// Rejected submissions
    pub const REJECTED: &str = "txpool.rejected";
    /// Entries evicted under capacity pressure
    pub const EVICTED: &str = "txpool.evicted";
    /// Queued entries removed by the expiry sweep
    pub const EXPIRED: &str = "txpool.expired";
    /// Current pending entry count
    pub const PENDING: &str = "txpool.pending";
    /// Current queued entry count
    pub const QUEUED: &str = "txpool.queued";
    /// Admission latency in microseconds
    pub const ADD_LATENCY: &str = "txpool.add_us";
}

/// Notification hook for propagation layers.
///
/// Fired once per successful admission or replacement, never on
/// rejection. Callbacks run on the submitting thread after the sender's
/// critical section has been released and must not block.
pub trait PoolListener: Send + Sync {
    /// A transaction entered the pool or replaced an existing slot
    fn on_accepted(&self, tx: &PooledTransaction);
}

/// Per-account pool state
#[derive(Default)]
pub(crate) struct AccountTxs {
    /// Pending transactions (nonce -> tx): the contiguous run starting at
    /// `state_nonce`, ready for inclusion
    pub(crate) pending: BTreeMap<u64, PooledTransaction>,
    /// Queued transactions (nonce -> tx), blocked behind a nonce gap
    pub(crate) queued: BTreeMap<u64, PooledTransaction>,
    /// Current nonce from state; refreshed on admission and commit
    pub(crate) state_nonce: u64,
}

impl AccountTxs {
    pub(crate) fn len(&self) -> usize {
        self.pending.len() + self.queued.len()
    }

    /// Nonce the next pending entry must carry. The pending map holds
    /// exactly `state_nonce .. state_nonce + len`.
    pub(crate) fn next_pending_nonce(&self) -> u64 {
        self.state_nonce + self.pending.len() as u64
    }
}

/// Transaction pool
///
/// Locking is sharded by sender: every mutation takes one short critical
/// section on the submitting account, so unrelated senders proceed in
/// parallel. Account state is fetched before the critical section and
/// re-validated inside it.
pub struct TxPool {
    /// Configuration
    pub(crate) config: PoolConfig,
    /// Confirmed account state lookup
    state: Arc<dyn AccountStateProvider>,
    /// Base fee of the block currently being built
    base_fee: RwLock<u128>,
    /// All transactions by content hash
    pub(crate) by_hash: DashMap<H256, PooledTransaction>,
    /// Transactions organized by sender
    pub(crate) by_sender: DashMap<Address, RwLock<AccountTxs>>,
    /// Pending count
    pending_count: AtomicUsize,
    /// Queued count
    queued_count: AtomicUsize,
    /// Insertion sequence source
    next_seq: AtomicU64,
    /// Accepted-transaction hooks
    listeners: RwLock<Vec<Arc<dyn PoolListener>>>,
    /// Pool metrics
    metrics: Arc<Metrics>,
}

impl TxPool {
    /// Create new pool with config
    pub fn new(config: PoolConfig, state: Arc<dyn AccountStateProvider>) -> Self {
        let base_fee = config.base_fee;
        Self {
            config,
            state,
            base_fee: RwLock::new(base_fee),
            by_hash: DashMap::new(),
            by_sender: DashMap::new(),
            pending_count: AtomicUsize::new(0),
            queued_count: AtomicUsize::new(0),
            next_seq: AtomicU64::new(0),
            listeners: RwLock::new(Vec::new()),
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Pool metrics handle
    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    /// Register an accepted-transaction hook
    pub fn add_listener(&self, listener: Arc<dyn PoolListener>) {
        self.listeners.write().push(listener);
    }

    /// Base fee used for admission pricing and candidate ordering
    pub fn base_fee(&self) -> u128 {
        *self.base_fee.read()
    }

    /// Update the base fee, e.g. when a new head block arrives
    pub fn set_base_fee(&self, base_fee: u128) {
        *self.base_fee.write() = base_fee;
    }

    /// Add a transaction to the pool.
    ///
    /// The sender must have been recovered from the signature upstream.
    /// Returns the content hash under which the transaction was admitted,
    /// or a typed rejection; submissions are never silently dropped.
    pub fn add(&self, tx: SignedTransaction, sender: Address) -> TxPoolResult<H256> {
        let result = ember_metrics::timed!(self.metrics, metric::ADD_LATENCY, {
            self.add_inner(tx, sender)
        });
        match result {
            Ok((pooled, replaced)) => {
                let name = if replaced { metric::REPLACED } else { metric::ACCEPTED };
                self.metrics.inc(name, 1);
                self.update_gauges();
                debug!(
                    hash = %pooled.hash,
                    sender = %pooled.sender,
                    nonce = pooled.nonce(),
                    replaced,
                    "transaction accepted"
                );
                self.notify_accepted(&pooled);
                Ok(pooled.hash)
            }
            Err(err) => {
                self.metrics.inc(metric::REJECTED, 1);
                self.update_gauges();
                warn!(sender = %sender, error = %err, "transaction rejected");
                Err(err)
            }
        }
    }

    fn add_inner(
        &self,
        tx: SignedTransaction,
        sender: Address,
    ) -> TxPoolResult<(PooledTransaction, bool)> {
        let hash = tx.content_hash();
        if self.by_hash.contains_key(&hash) {
            return Err(TxPoolError::DuplicateTransaction(hash));
        }

        // Account state is fetched before the critical section so the
        // lock is never held across the external lookup; the nonce is
        // re-validated against the cached value inside.
        let account_state = self.state.account_state(&sender);
        let base_fee = self.base_fee();
        let effective_gas_price =
            validate::validate_admission(&tx, &account_state, &self.config, base_fee)?;

        let pooled = PooledTransaction {
            tx,
            sender,
            hash,
            effective_gas_price,
            added_at: Instant::now(),
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
        };

        let replaced = {
            let account_entry = self
                .by_sender
                .entry(sender)
                .or_insert_with(|| RwLock::new(AccountTxs::default()));
            let mut account = account_entry.write();

            // A commit may have advanced the chain since the pre-fetch;
            // trust whichever view is freshest.
            account.state_nonce = account.state_nonce.max(account_state.nonce);
            let nonce = pooled.nonce();
            if nonce < account.state_nonce {
                return Err(TxPoolError::NonceTooLow {
                    expected: account.state_nonce,
                    got: nonce,
                });
            }

            let occupied =
                account.pending.contains_key(&nonce) || account.queued.contains_key(&nonce);
            if occupied {
                self.replace_at(&mut account, pooled.clone())?;
                true
            } else {
                self.insert_fresh(&mut account, pooled.clone())?;
                false
            }
        };

        // Pool-wide capacity is enforced outside the sender's critical
        // section: eviction locks one account at a time.
        if !replaced && self.len() > self.config.max_total {
            self.enforce_pool_capacity(&hash)?;
        }

        Ok((pooled, replaced))
    }

    /// Overwrite the occupied (sender, nonce) slot if the candidate pays
    /// the configured fee bump on both axes.
    fn replace_at(&self, account: &mut AccountTxs, pooled: PooledTransaction) -> TxPoolResult<()> {
        let nonce = pooled.nonce();
        let in_pending = account.pending.contains_key(&nonce);
        let old = if in_pending {
            &account.pending[&nonce]
        } else {
            &account.queued[&nonce]
        };

        if old.hash == pooled.hash {
            return Err(TxPoolError::DuplicateTransaction(pooled.hash));
        }
        if !validate::meets_replacement_bump(&old.tx, &pooled.tx, self.config.price_bump_percent) {
            return Err(TxPoolError::ReplacementUnderpriced {
                old: old.tx.max_fee_per_gas(),
                new: pooled.tx.max_fee_per_gas(),
            });
        }

        let old_hash = old.hash;
        self.by_hash.remove(&old_hash);
        self.by_hash.insert(pooled.hash, pooled.clone());
        debug!(
            sender = %pooled.sender,
            nonce,
            old = %old_hash,
            new = %pooled.hash,
            "replaced transaction"
        );
        // Tier is preserved; counts are unchanged. Promotion re-runs for
        // completeness since the slot content changed.
        if in_pending {
            account.pending.insert(nonce, pooled);
        } else {
            account.queued.insert(nonce, pooled);
        }
        self.promote(account);
        Ok(())
    }

    /// Insert into an unoccupied slot, classify, then enforce the
    /// per-sender cap.
    fn insert_fresh(&self, account: &mut AccountTxs, pooled: PooledTransaction) -> TxPoolResult<()> {
        let nonce = pooled.nonce();
        let hash = pooled.hash;
        self.by_hash.insert(hash, pooled.clone());
        if nonce == account.next_pending_nonce() {
            account.pending.insert(nonce, pooled);
            self.pending_count.fetch_add(1, Ordering::SeqCst);
            // the new entry may close a gap
            self.promote(account);
        } else {
            account.queued.insert(nonce, pooled);
            self.queued_count.fetch_add(1, Ordering::SeqCst);
        }

        if account.len() > self.config.max_per_account {
            self.enforce_account_cap(account, &hash)?;
        }
        Ok(())
    }

    /// Promote queued transactions while the nonce gap stays closed
    pub(crate) fn promote(&self, account: &mut AccountTxs) {
        let mut next = account.next_pending_nonce();
        while let Some(tx) = account.queued.remove(&next) {
            debug!(sender = %tx.sender, nonce = next, "promoting queued transaction");
            account.pending.insert(next, tx);
            self.queued_count.fetch_sub(1, Ordering::SeqCst);
            self.pending_count.fetch_add(1, Ordering::SeqCst);
            next += 1;
        }
    }

    /// Remove the entry at `nonce` from the account, keeping the pending
    /// run contiguous: anything pending above a removed pending slot is
    /// demoted back to queued.
    pub(crate) fn remove_at(
        &self,
        account: &mut AccountTxs,
        nonce: u64,
    ) -> Option<PooledTransaction> {
        if let Some(tx) = account.pending.remove(&nonce) {
            self.by_hash.remove(&tx.hash);
            self.pending_count.fetch_sub(1, Ordering::SeqCst);
            let demoted = account.pending.split_off(&nonce);
            for (n, t) in demoted {
                account.queued.insert(n, t);
                self.pending_count.fetch_sub(1, Ordering::SeqCst);
                self.queued_count.fetch_add(1, Ordering::SeqCst);
            }
            Some(tx)
        } else if let Some(tx) = account.queued.remove(&nonce) {
            self.by_hash.remove(&tx.hash);
            self.queued_count.fetch_sub(1, Ordering::SeqCst);
            Some(tx)
        } else {
            None
        }
    }

    /// Remove transaction by hash
    pub fn remove(&self, hash: &H256) -> Option<PooledTransaction> {
        let (_, pooled) = self.by_hash.remove(hash)?;
        if let Some(account_entry) = self.by_sender.get(&pooled.sender) {
            let mut account = account_entry.write();
            let nonce = pooled.nonce();
            // the slot may have been replaced since the index lookup
            let occupant = account
                .pending
                .get(&nonce)
                .or_else(|| account.queued.get(&nonce))
                .map(|t| t.hash);
            if occupant == Some(*hash) {
                self.remove_at(&mut account, nonce);
            }
        }
        self.update_gauges();
        Some(pooled)
    }

    /// Get transaction by hash
    pub fn get_by_hash(&self, hash: &H256) -> Option<PooledTransaction> {
        self.by_hash.get(hash).map(|r| r.clone())
    }

    /// Update an account's confirmed nonce, e.g. after a block imported
    /// from elsewhere advanced the chain. Consumed entries are purged and
    /// queued entries promoted across the closed gap.
    pub fn set_nonce(&self, address: &Address, nonce: u64) {
        if let Some(entry) = self.by_sender.get(address) {
            let mut account = entry.write();
            self.advance_nonce(&mut account, nonce);
            self.promote(&mut account);
        }
        self.update_gauges();
    }

    /// Advance the cached nonce and purge entries below it
    pub(crate) fn advance_nonce(&self, account: &mut AccountTxs, nonce: u64) {
        if nonce <= account.state_nonce {
            return;
        }
        account.state_nonce = nonce;

        let keep = account.pending.split_off(&nonce);
        for (_, tx) in std::mem::replace(&mut account.pending, keep) {
            self.by_hash.remove(&tx.hash);
            self.pending_count.fetch_sub(1, Ordering::SeqCst);
        }

        let keep = account.queued.split_off(&nonce);
        for (_, tx) in std::mem::replace(&mut account.queued, keep) {
            self.by_hash.remove(&tx.hash);
            self.queued_count.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Remove queued transactions older than the configured lifetime.
    ///
    /// Runs synchronously in time bounded by the pool size; callers
    /// schedule it periodically. Returns the number of removed entries.
    pub fn sweep_expired(&self) -> usize {
        let lifetime = self.config.queued_lifetime;
        let senders: Vec<Address> = self.by_sender.iter().map(|e| *e.key()).collect();
        let mut removed = 0;
        for sender in senders {
            let Some(entry) = self.by_sender.get(&sender) else {
                continue;
            };
            let mut account = entry.write();
            let expired: Vec<u64> = account
                .queued
                .iter()
                .filter(|(_, tx)| tx.added_at.elapsed() >= lifetime)
                .map(|(n, _)| *n)
                .collect();
            for nonce in expired {
                if let Some(tx) = account.queued.remove(&nonce) {
                    self.by_hash.remove(&tx.hash);
                    self.queued_count.fetch_sub(1, Ordering::SeqCst);
                    self.metrics.inc(metric::EXPIRED, 1);
                    debug!(sender = %sender, nonce, hash = %tx.hash, "expired queued transaction");
                    removed += 1;
                }
            }
        }
        if removed > 0 {
            self.update_gauges();
        }
        removed
    }

    /// Get total number of transactions
    pub fn len(&self) -> usize {
        self.pending_count.load(Ordering::SeqCst) + self.queued_count.load(Ordering::SeqCst)
    }

    /// Check if pool is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get pending transaction count
    pub fn pending_len(&self) -> usize {
        self.pending_count.load(Ordering::SeqCst)
    }

    /// Get queued transaction count
    pub fn queued_len(&self) -> usize {
        self.queued_count.load(Ordering::SeqCst)
    }

    /// Clear all transactions
    pub fn clear(&self) {
        self.by_hash.clear();
        self.by_sender.clear();
        self.pending_count.store(0, Ordering::SeqCst);
        self.queued_count.store(0, Ordering::SeqCst);
        self.update_gauges();
    }

    pub(crate) fn note_evicted(&self, tx: &PooledTransaction) {
        self.metrics.inc(metric::EVICTED, 1);
        debug!(
            sender = %tx.sender,
            nonce = tx.nonce(),
            hash = %tx.hash,
            "evicted transaction under capacity pressure"
        );
    }

    pub(crate) fn update_gauges(&self) {
        self.metrics
            .set(metric::PENDING, self.pending_len() as i64);
        self.metrics.set(metric::QUEUED, self.queued_len() as i64);
    }

    fn notify_accepted(&self, tx: &PooledTransaction) {
        for listener in self.listeners.read().iter() {
            listener.on_accepted(tx);
        }
    }
}

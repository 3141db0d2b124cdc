//! Capacity enforcement
//!
//! Victims are chosen least-valuable first: queued entries by lowest
//! effective fee (oldest wins a tie), then pending entries from each
//! sender's highest-nonce tail so the contiguous pending run is never
//! broken from below. If the least valuable entry turns out to be the
//! submission that triggered the overflow, it is removed and the
//! submission fails with `PoolFull` instead of churning older entries.

use ember_primitives::{Address, H256};

use crate::error::{TxPoolError, TxPoolResult};
use crate::pool::{AccountTxs, TxPool};

struct Victim {
    sender: Address,
    nonce: u64,
    hash: H256,
    fee: u128,
    seq: u64,
}

impl Victim {
    /// `true` if self should be evicted before `other`
    fn worse_than(&self, other: &Victim) -> bool {
        (self.fee, self.seq) < (other.fee, other.seq)
    }
}

impl TxPool {
    /// Enforce the per-sender cap after an insertion into `account`.
    ///
    /// `newest` is the hash of the transaction just inserted; if it is
    /// chosen as the victim the caller's submission fails.
    pub(crate) fn enforce_account_cap(
        &self,
        account: &mut AccountTxs,
        newest: &H256,
    ) -> TxPoolResult<()> {
        while account.len() > self.config.max_per_account {
            let Some((nonce, hash)) = account_victim(account) else {
                break;
            };
            let removed = self.remove_at(account, nonce);
            if hash == *newest {
                return Err(TxPoolError::PoolFull(self.config.max_per_account));
            }
            if let Some(tx) = removed {
                self.note_evicted(&tx);
            }
        }
        Ok(())
    }

    /// Enforce the pool-wide cap.
    ///
    /// Runs outside any account critical section and locks one sender at
    /// a time, re-checking each victim under its lock before removal.
    pub(crate) fn enforce_pool_capacity(&self, newest: &H256) -> TxPoolResult<()> {
        while self.len() > self.config.max_total {
            let Some(victim) = self.global_victim() else {
                break;
            };
            self.evict_global(&victim, newest)?;
        }
        Ok(())
    }

    fn evict_global(&self, victim: &Victim, newest: &H256) -> TxPoolResult<()> {
        let Some(entry) = self.by_sender.get(&victim.sender) else {
            return Ok(());
        };
        let mut account = entry.write();
        // the account may have changed between the pick and the lock
        let occupant = account
            .queued
            .get(&victim.nonce)
            .or_else(|| account.pending.get(&victim.nonce))
            .map(|t| t.hash);
        if occupant != Some(victim.hash) {
            return Ok(());
        }

        let removed = self.remove_at(&mut account, victim.nonce);
        if victim.hash == *newest {
            return Err(TxPoolError::PoolFull(self.config.max_total));
        }
        if let Some(tx) = removed {
            self.note_evicted(&tx);
        }
        Ok(())
    }

    /// Least valuable entry across the whole pool
    fn global_victim(&self) -> Option<Victim> {
        let mut best: Option<Victim> = None;

        // queued entries go first
        for entry in self.by_sender.iter() {
            let account = entry.value().read();
            if let Some(candidate) = queued_victim(*entry.key(), &account) {
                if best.as_ref().map_or(true, |b| candidate.worse_than(b)) {
                    best = Some(candidate);
                }
            }
        }
        if best.is_some() {
            return best;
        }

        // only pending left: take the cheapest sender tail
        for entry in self.by_sender.iter() {
            let account = entry.value().read();
            if let Some((nonce, tx)) = account.pending.iter().next_back() {
                let candidate = Victim {
                    sender: *entry.key(),
                    nonce: *nonce,
                    hash: tx.hash,
                    fee: tx.effective_gas_price,
                    seq: tx.seq,
                };
                if best.as_ref().map_or(true, |b| candidate.worse_than(b)) {
                    best = Some(candidate);
                }
            }
        }
        best
    }
}

/// Victim within one account: cheapest queued entry, otherwise the
/// pending tail. Returns (nonce, hash).
fn account_victim(account: &AccountTxs) -> Option<(u64, H256)> {
    if let Some((nonce, tx)) = account.queued.iter().min_by(|(_, a), (_, b)| {
        (a.effective_gas_price, a.seq).cmp(&(b.effective_gas_price, b.seq))
    }) {
        return Some((*nonce, tx.hash));
    }
    account
        .pending
        .iter()
        .next_back()
        .map(|(nonce, tx)| (*nonce, tx.hash))
}

fn queued_victim(sender: Address, account: &AccountTxs) -> Option<Victim> {
    account
        .queued
        .iter()
        .min_by(|(_, a), (_, b)| (a.effective_gas_price, a.seq).cmp(&(b.effective_gas_price, b.seq)))
        .map(|(nonce, tx)| Victim {
            sender,
            nonce: *nonce,
            hash: tx.hash,
            fee: tx.effective_gas_price,
            seq: tx.seq,
        })
}

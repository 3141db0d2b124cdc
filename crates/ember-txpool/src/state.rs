//! Account state access
//!
//! The pool does not own account state. It reads the current nonce and
//! spendable balance through [`AccountStateProvider`], fetching before a
//! per-sender critical section and re-validating inside it.

use dashmap::DashMap;
use ember_primitives::Address;

/// Confirmed on-chain view of an account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountState {
    /// Current confirmed nonce; advances only on block commit
    pub nonce: u64,
    /// Spendable balance in wei
    pub balance: u128,
}

/// Read access to confirmed account state.
///
/// Implementations must answer for unknown accounts with the default
/// state (nonce 0, zero balance) rather than failing; lookups must not
/// block unboundedly since admission latency sits on this path.
pub trait AccountStateProvider: Send + Sync {
    /// Current nonce and balance for an address
    fn account_state(&self, address: &Address) -> AccountState;
}

/// In-memory account state, for tests and single-process deployments
#[derive(Default)]
pub struct MemoryState {
    accounts: DashMap<Address, AccountState>,
}

impl MemoryState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an account's nonce and balance
    pub fn set_account(&self, address: Address, nonce: u64, balance: u128) {
        self.accounts.insert(address, AccountState { nonce, balance });
    }

    /// Advance an account's nonce, e.g. after block execution
    pub fn set_nonce(&self, address: Address, nonce: u64) {
        self.accounts.entry(address).or_default().nonce = nonce;
    }

    /// Set an account's balance
    pub fn set_balance(&self, address: Address, balance: u128) {
        self.accounts.entry(address).or_default().balance = balance;
    }
}

impl AccountStateProvider for MemoryState {
    fn account_state(&self, address: &Address) -> AccountState {
        self.accounts
            .get(address)
            .map(|entry| *entry.value())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_account_is_default() {
        let state = MemoryState::new();
        let addr = Address::from_bytes([1u8; 20]);
        assert_eq!(state.account_state(&addr), AccountState::default());
    }

    #[test]
    fn test_set_and_read_back() {
        let state = MemoryState::new();
        let addr = Address::from_bytes([1u8; 20]);
        state.set_account(addr, 7, 1000);
        let st = state.account_state(&addr);
        assert_eq!(st.nonce, 7);
        assert_eq!(st.balance, 1000);
    }

    #[test]
    fn test_set_nonce_keeps_balance() {
        let state = MemoryState::new();
        let addr = Address::from_bytes([1u8; 20]);
        state.set_account(addr, 0, 500);
        state.set_nonce(addr, 3);
        let st = state.account_state(&addr);
        assert_eq!(st.nonce, 3);
        assert_eq!(st.balance, 500);
    }
}

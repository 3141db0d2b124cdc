//! Transaction pool error types

use ember_primitives::H256;
use thiserror::Error;

/// Transaction pool rejection reasons
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TxPoolError {
    /// Nonce below the account's current nonce
    #[error("nonce too low: expected >= {expected}, got {got}")]
    NonceTooLow {
        /// Current account nonce
        expected: u64,
        /// Transaction nonce
        got: u64,
    },

    /// Balance does not cover value plus worst-case fee
    #[error("insufficient funds for gas * price + value: required {required}, available {available}")]
    InsufficientFunds {
        /// Required balance
        required: u128,
        /// Available balance
        available: u128,
    },

    /// Gas limit exceeds the block gas limit
    #[error("gas limit exceeds block limit: {gas_limit} > {block_limit}")]
    GasLimitExceeded {
        /// Transaction gas limit
        gas_limit: u64,
        /// Block gas limit
        block_limit: u64,
    },

    /// Gas limit below the intrinsic cost of the transaction shape
    #[error("intrinsic gas too low: required {required}, got {got}")]
    IntrinsicGasTooLow {
        /// Intrinsic gas required by the payload
        required: u64,
        /// Transaction gas limit
        got: u64,
    },

    /// Tip cap above fee cap
    #[error("max priority fee per gas higher than max fee per gas: {tip_cap} > {fee_cap}")]
    PriorityFeeExceedsMaxFee {
        /// Tip cap
        tip_cap: u128,
        /// Fee cap
        fee_cap: u128,
    },

    /// Fee below the pool's acceptance floor
    #[error("transaction underpriced: {0}")]
    Underpriced(u128),

    /// Same-slot replacement below the required fee bump
    #[error("replacement transaction underpriced: old {old}, new {new}")]
    ReplacementUnderpriced {
        /// Displaced transaction's fee cap
        old: u128,
        /// Candidate's fee cap
        new: u128,
    },

    /// Pool or per-account capacity exhausted and the submission was the
    /// least valuable candidate
    #[error("txpool is full (capacity: {0})")]
    PoolFull(usize),

    /// Identical transaction already in the pool
    #[error("already known: {0}")]
    DuplicateTransaction(H256),
}

/// Result type for transaction pool operations
pub type TxPoolResult<T> = Result<T, TxPoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TxPoolError::NonceTooLow { expected: 5, got: 3 };
        let msg = format!("{}", err);
        assert!(msg.contains('5'));
        assert!(msg.contains('3'));

        let err = TxPoolError::InsufficientFunds {
            required: 100,
            available: 50,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));

        let err = TxPoolError::ReplacementUnderpriced { old: 10, new: 5 };
        assert!(format!("{}", err).contains("replacement transaction underpriced"));

        let err = TxPoolError::DuplicateTransaction(H256::from_bytes([7u8; 32]));
        assert!(format!("{}", err).starts_with("already known"));
    }

    #[test]
    fn test_error_equality() {
        let a = TxPoolError::PoolFull(16);
        let b = TxPoolError::PoolFull(16);
        assert_eq!(a, b);
        assert_ne!(a, TxPoolError::PoolFull(17));
    }
}

//! Admission validation
//!
//! Checks run in a fixed order so a transaction failing several rules
//! reports the same rejection every time: nonce, funds, gas bounds, fee
//! terms, fee floor. Nonce and funds are re-checked under the account
//! lock by the caller; the account state passed here is a pre-fetched
//! snapshot.

use ember_types::SignedTransaction;

use crate::config::PoolConfig;
use crate::error::{TxPoolError, TxPoolResult};
use crate::state::AccountState;

/// Validate a candidate against account state and pool rules.
///
/// Returns the effective gas price at `base_fee` on success; the caller
/// caches it on the pool entry for eviction ordering.
pub(crate) fn validate_admission(
    tx: &SignedTransaction,
    account: &AccountState,
    config: &PoolConfig,
    base_fee: u128,
) -> TxPoolResult<u128> {
    check_nonce(tx, account)?;
    check_funds(tx, account)?;
    check_gas(tx, config)?;
    check_fee_terms(tx)?;

    let effective = tx
        .effective_gas_price(base_fee)
        .ok_or(TxPoolError::Underpriced(tx.max_fee_per_gas()))?;
    if effective < config.min_gas_price {
        return Err(TxPoolError::Underpriced(effective));
    }
    Ok(effective)
}

/// Nonce must not be below the account's current nonce. Higher nonces
/// are fine; a gap only affects classification, never admission.
pub(crate) fn check_nonce(tx: &SignedTransaction, account: &AccountState) -> TxPoolResult<()> {
    if tx.nonce() < account.nonce {
        return Err(TxPoolError::NonceTooLow {
            expected: account.nonce,
            got: tx.nonce(),
        });
    }
    Ok(())
}

fn check_funds(tx: &SignedTransaction, account: &AccountState) -> TxPoolResult<()> {
    let required = tx.max_cost();
    if account.balance < required {
        return Err(TxPoolError::InsufficientFunds {
            required,
            available: account.balance,
        });
    }
    Ok(())
}

fn check_gas(tx: &SignedTransaction, config: &PoolConfig) -> TxPoolResult<()> {
    let gas_limit = tx.gas_limit();
    if gas_limit > config.block_gas_limit {
        return Err(TxPoolError::GasLimitExceeded {
            gas_limit,
            block_limit: config.block_gas_limit,
        });
    }
    let intrinsic = tx.intrinsic_gas();
    if gas_limit < intrinsic {
        return Err(TxPoolError::IntrinsicGasTooLow {
            required: intrinsic,
            got: gas_limit,
        });
    }
    Ok(())
}

fn check_fee_terms(tx: &SignedTransaction) -> TxPoolResult<()> {
    // Legacy transactions bid one price for both terms and can never trip
    // this.
    let tip_cap = tx.max_priority_fee_per_gas();
    let fee_cap = tx.max_fee_per_gas();
    if tip_cap > fee_cap {
        return Err(TxPoolError::PriorityFeeExceedsMaxFee { tip_cap, fee_cap });
    }
    Ok(())
}

/// Whether `new` pays the configured bump over `old` on both fee axes.
///
/// The threshold is a strict minimum: an equal or marginally higher fee
/// does not qualify.
pub(crate) fn meets_replacement_bump(
    old: &SignedTransaction,
    new: &SignedTransaction,
    bump_percent: u128,
) -> bool {
    let min_fee_cap = bumped(old.max_fee_per_gas(), bump_percent);
    let min_tip_cap = bumped(old.max_priority_fee_per_gas(), bump_percent);
    new.max_fee_per_gas() >= min_fee_cap && new.max_priority_fee_per_gas() >= min_tip_cap
}

fn bumped(fee: u128, bump_percent: u128) -> u128 {
    // strictly greater than the old fee even when the percentage rounds
    // to zero
    let min = fee.saturating_add(fee.saturating_mul(bump_percent) / 100);
    min.max(fee.saturating_add(1))
}

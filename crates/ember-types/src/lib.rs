//! # ember-types
//!
//! Core transaction types for EmberLedger.
//!
//! This crate provides:
//! - [`SignedTransaction`](transaction::SignedTransaction) - Signed transactions
//! - Fee-term accessors used by the transaction pool (fee cap, tip cap,
//!   effective gas price, maximum cost)
//! - Intrinsic gas derivation from the transaction shape

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod transaction;

pub use transaction::{
    AccessListItem, DynamicFeeTx, LegacyTx, SignedTransaction, TransactionBody, TxSignature,
    TxType,
};

//! # ember-primitives
//!
//! Primitive types for the EmberLedger transaction pool.
//!
//! This crate provides the fundamental data types used throughout the system.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;

pub use address::Address;
pub use error::PrimitiveError;
pub use hash::{Hash, H256};

/// Block height type
pub type BlockHeight = u64;

/// Transaction nonce type
pub type Nonce = u64;

/// Gas type
pub type Gas = u64;

/// Wei amount type (fees, balances, values)
pub type Wei = u128;

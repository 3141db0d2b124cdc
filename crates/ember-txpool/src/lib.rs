//! # ember-txpool
//!
//! Transaction pool for EmberLedger.
//!
//! This crate provides:
//! - Transaction admission with typed rejections
//! - Pending/queued transaction separation with nonce-gap handling
//! - Transaction replacement gated by a fee bump threshold
//! - Pool size limits with fee-ordered eviction and queued-entry expiry
//! - Deterministically ordered block candidate selection
//! - Read-only status/content/inspect snapshots
//!
//! ## Architecture
//!
//! ```text
//! +---------------------+
//! |       TxPool        |
//! +---------------------+
//!           |
//! +---------+----------+
//! | Pending  |  Queued |  <- Per-account tx organization
//! +---------+----------+
//!           |
//! +---------------------+
//! |    By Hash Index    |  <- Fast lookup by tx hash
//! +---------------------+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use ember_txpool::{MemoryState, PoolConfig, TxPool};
//!
//! let pool = TxPool::new(PoolConfig::default(), state);
//! let hash = pool.add(tx, sender)?;
//! let candidates = pool.best_transactions(100);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod commit;
mod config;
mod entry;
mod error;
mod evict;
mod pool;
mod query;
mod select;
mod state;
#[cfg(test)]
mod test_util;
mod validate;

pub use commit::TxDisposition;
pub use config::PoolConfig;
pub use entry::PooledTransaction;
pub use error::{TxPoolError, TxPoolResult};
pub use pool::{metric, PoolListener, TxPool};
pub use query::{PoolContent, PoolInspect, PoolStatus};
pub use state::{AccountState, AccountStateProvider, MemoryState};

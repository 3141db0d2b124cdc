//! # ember-rpc
//!
//! Typed query surface for the EmberLedger transaction pool.
//!
//! Requests and responses form a tagged-variant model validated at the
//! boundary; transport framing (HTTP, websockets) is out of scope and
//! lives with the embedding node.
//!
//! ## Usage
//!
//! ```ignore
//! use ember_rpc::{PoolApi, PoolRequest};
//!
//! let api = PoolApi::new(pool);
//! let response = api.dispatch(PoolRequest::Status).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod api;
mod error;
mod types;

pub use api::PoolApi;
pub use error::{error_code, RpcError};
pub use types::{
    ContentResponse, InspectResponse, PoolRequest, PoolResponse, RpcPoolTransaction,
    RpcSubmission, StatusResponse,
};

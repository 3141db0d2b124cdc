//! RPC error types

use ember_txpool::TxPoolError;
use serde::Serialize;
use thiserror::Error;

/// Error codes for the query surface
pub mod error_code {
    /// Invalid request: not a valid tagged request object
    pub const INVALID_REQUEST: i64 = -32600;
    /// Method not found
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Invalid params
    pub const INVALID_PARAMS: i64 = -32602;
    /// Internal error
    pub const INTERNAL_ERROR: i64 = -32603;
    /// Transaction rejected by the pool
    pub const TRANSACTION_REJECTED: i64 = -32003;
}

/// Error returned by the pool query surface
#[derive(Debug, Clone, Error, Serialize, PartialEq, Eq)]
#[error("rpc error {code}: {message}")]
pub struct RpcError {
    /// Error code
    pub code: i64,
    /// Error message
    pub message: String,
}

impl RpcError {
    /// Create a new error
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Malformed request object
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(error_code::INVALID_REQUEST, message)
    }

    /// Unknown method
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::new(
            error_code::METHOD_NOT_FOUND,
            format!("method not found: {}", method.into()),
        )
    }

    /// Invalid parameters
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(error_code::INVALID_PARAMS, message)
    }

    /// Internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(error_code::INTERNAL_ERROR, message)
    }

    /// Submission rejected by the pool
    pub fn transaction_rejected(message: impl Into<String>) -> Self {
        Self::new(error_code::TRANSACTION_REJECTED, message)
    }
}

impl From<TxPoolError> for RpcError {
    fn from(err: TxPoolError) -> Self {
        Self::transaction_rejected(err.to_string())
    }
}

//! Request dispatch over the transaction pool

use std::collections::BTreeMap;
use std::sync::Arc;

use ember_metrics::MetricsSnapshot;
use ember_txpool::{PoolContent, PoolInspect, PooledTransaction, TxPool};
use serde_json::Value;
use tracing::debug;

use crate::error::RpcError;
use crate::types::{
    format_u64, ContentResponse, InspectResponse, PoolRequest, PoolResponse, RpcPoolTransaction,
    RpcSubmission, StatusResponse,
};

/// Pool query API
///
/// Owns no state beyond a handle to the pool; cheap to clone and share
/// between transport handlers.
#[derive(Clone)]
pub struct PoolApi {
    pool: Arc<TxPool>,
}

impl PoolApi {
    /// Create an API over a pool handle
    pub fn new(pool: Arc<TxPool>) -> Self {
        Self { pool }
    }

    /// Dispatch a typed request
    pub async fn dispatch(&self, request: PoolRequest) -> Result<PoolResponse, RpcError> {
        match request {
            PoolRequest::Status => Ok(PoolResponse::Status(self.status())),
            PoolRequest::Content => Ok(PoolResponse::Content(self.content())),
            PoolRequest::Inspect => Ok(PoolResponse::Inspect(self.inspect())),
            PoolRequest::Metrics => Ok(PoolResponse::Metrics(self.metrics())),
            PoolRequest::Submit(submission) => {
                let hash = self.submit(submission)?;
                Ok(PoolResponse::Submitted(hash))
            }
        }
    }

    /// Dispatch a raw JSON request value, validating it at the boundary
    pub async fn dispatch_value(&self, request: Value) -> Result<PoolResponse, RpcError> {
        let request: PoolRequest = serde_json::from_value(request)
            .map_err(|e| RpcError::invalid_request(e.to_string()))?;
        self.dispatch(request).await
    }

    /// `txpool_status`
    pub fn status(&self) -> StatusResponse {
        let status = self.pool.status();
        StatusResponse {
            pending: format_u64(status.pending as u64),
            queued: format_u64(status.queued as u64),
        }
    }

    /// `txpool_content`
    pub fn content(&self) -> ContentResponse {
        let PoolContent { pending, queued } = self.pool.content();
        ContentResponse {
            pending: content_map(pending),
            queued: content_map(queued),
        }
    }

    /// `txpool_inspect`
    pub fn inspect(&self) -> InspectResponse {
        let PoolInspect { pending, queued } = self.pool.inspect();
        InspectResponse {
            pending: inspect_map(pending),
            queued: inspect_map(queued),
        }
    }

    /// `txpool_metrics`
    pub fn metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot::from_metrics(&self.pool.metrics())
    }

    /// `txpool_submit`: validate and admit a pre-recovered transaction
    pub fn submit(&self, submission: RpcSubmission) -> Result<String, RpcError> {
        let (tx, sender) = submission.into_signed()?;
        debug!(sender = %sender, nonce = tx.nonce(), "rpc submission");
        let hash = self.pool.add(tx, sender)?;
        Ok(hash.to_hex())
    }
}

fn content_map(
    tier: BTreeMap<ember_primitives::Address, BTreeMap<u64, PooledTransaction>>,
) -> BTreeMap<String, BTreeMap<String, RpcPoolTransaction>> {
    tier.into_iter()
        .map(|(sender, txs)| {
            let txs = txs
                .iter()
                .map(|(nonce, tx)| (format_u64(*nonce), RpcPoolTransaction::from_pooled(tx)))
                .collect();
            (sender.to_hex(), txs)
        })
        .collect()
}

fn inspect_map(
    tier: BTreeMap<ember_primitives::Address, BTreeMap<u64, String>>,
) -> BTreeMap<String, BTreeMap<String, String>> {
    tier.into_iter()
        .map(|(sender, txs)| {
            let txs = txs
                .into_iter()
                .map(|(nonce, summary)| (format_u64(nonce), summary))
                .collect();
            (sender.to_hex(), txs)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_primitives::Address;
    use ember_txpool::{MemoryState, PoolConfig};
    use serde_json::json;

    const GWEI: u128 = 1_000_000_000;

    fn api() -> PoolApi {
        let state = Arc::new(MemoryState::new());
        state.set_account(alice(), 0, u128::MAX);
        state.set_account(bob(), 0, u128::MAX);
        PoolApi::new(Arc::new(TxPool::new(PoolConfig::default(), state)))
    }

    fn alice() -> Address {
        Address::from_bytes([0x11; 20])
    }

    fn bob() -> Address {
        Address::from_bytes([0x22; 20])
    }

    fn submission(nonce: u64, gas_price: u128, to: &str, value: u128) -> RpcSubmission {
        RpcSubmission {
            from: alice().to_hex(),
            to: Some(to.to_string()),
            nonce: format_u64(nonce),
            gas: "0x5208".into(),
            value: Some(crate::types::format_u128(value)),
            gas_price: Some(crate::types::format_u128(gas_price)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_pool_status_is_zero_hex() {
        let api = api();
        let response = api.dispatch_value(json!({"method": "txpool_status"})).await.unwrap();
        let PoolResponse::Status(status) = response else {
            panic!("expected status");
        };
        assert_eq!(status.pending, "0x0");
        assert_eq!(status.queued, "0x0");

        let content = api.content();
        assert!(content.pending.is_empty());
        assert!(content.queued.is_empty());
        let inspect = api.inspect();
        assert!(inspect.pending.is_empty());
        assert!(inspect.queued.is_empty());
    }

    #[tokio::test]
    async fn test_pending_and_queued_content_shape() {
        let api = api();
        let pending_to = "0x0000000000000000000000000000000000051095";
        let queued_to = "0x1111111111111111111111111111111111051095";

        api.submit(submission(0, 10 * GWEI, pending_to, 1)).unwrap();
        api.submit(submission(2, 10 * GWEI, queued_to, 2)).unwrap();

        let status = api.status();
        assert_eq!(status.pending, "0x1");
        assert_eq!(status.queued, "0x1");

        let content = api.content();
        let sender_key = alice().to_hex();

        assert_eq!(content.pending.len(), 1);
        let by_nonce = &content.pending[&sender_key];
        let entry = &by_nonce["0x0"];
        assert_eq!(entry.to.as_deref(), Some(pending_to));
        assert_eq!(entry.value, "0x1");
        assert_eq!(entry.gas, "0x5208");

        assert_eq!(content.queued.len(), 1);
        let by_nonce = &content.queued[&sender_key];
        let entry = &by_nonce["0x2"];
        assert_eq!(entry.to.as_deref(), Some(queued_to));
        assert_eq!(entry.value, "0x2");

        let inspect = api.inspect();
        assert!(inspect.pending[&sender_key]["0x0"].contains(pending_to));
        assert!(inspect.queued[&sender_key]["0x2"].contains(queued_to));
    }

    #[tokio::test]
    async fn test_replacement_flow_over_rpc() {
        let api = api();
        let original_to = "0x0000000000000000000000000000000000051095";
        let replacement_to = "0x1111111111111111111111111111111111051095";

        api.submit(submission(1, 10 * GWEI, original_to, 1)).unwrap();

        // lower fee
        let err = api.submit(submission(1, 9 * GWEI, replacement_to, 2)).unwrap_err();
        assert!(err.message.contains("replacement transaction underpriced"));
        // equal fee
        let err = api.submit(submission(1, 10 * GWEI, replacement_to, 2)).unwrap_err();
        assert!(err.message.contains("replacement transaction underpriced"));

        // sufficient bump
        api.submit(submission(1, 20 * GWEI, replacement_to, 2)).unwrap();

        let content = api.content();
        let entry = &content.queued[&alice().to_hex()]["0x1"];
        assert_eq!(entry.to.as_deref(), Some(replacement_to));
        assert_eq!(entry.value, "0x2");
    }

    #[tokio::test]
    async fn test_status_serialized_shape() {
        let api = api();
        api.submit(submission(0, 10 * GWEI, "0x0000000000000000000000000000000000051095", 1))
            .unwrap();

        let response = api.dispatch(PoolRequest::Status).await.unwrap();
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["kind"], "status");
        assert_eq!(value["result"]["pending"], "0x1");
        assert_eq!(value["result"]["queued"], "0x0");
    }

    #[tokio::test]
    async fn test_content_serialized_shape() {
        let api = api();
        api.submit(submission(0, 10 * GWEI, "0x0000000000000000000000000000000000051095", 1))
            .unwrap();

        let response = api.dispatch(PoolRequest::Content).await.unwrap();
        let value = serde_json::to_value(&response).unwrap();
        let entry = &value["result"]["pending"][alice().to_hex()]["0x0"];
        assert_eq!(entry["to"], "0x0000000000000000000000000000000000051095");
        assert_eq!(entry["value"], "0x1");
        assert_eq!(entry["gasPrice"], "0x2540be400");
        assert_eq!(entry["from"], alice().to_hex());
        // legacy transactions carry no 1559 fields
        assert!(entry.get("maxFeePerGas").is_none());
    }

    #[tokio::test]
    async fn test_malformed_request_rejected_at_boundary() {
        let api = api();
        let err = api.dispatch_value(json!({"method": "txpool_everything"})).await.unwrap_err();
        assert_eq!(err.code, crate::error_code::INVALID_REQUEST);

        let err = api.dispatch_value(json!({"params": []})).await.unwrap_err();
        assert_eq!(err.code, crate::error_code::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_submit_rejection_carries_pool_error() {
        let api = api();
        // nonce, gas ok, but no funds on this sender
        let sub = RpcSubmission {
            from: Address::from_bytes([0x99; 20]).to_hex(),
            to: Some(bob().to_hex()),
            nonce: "0x0".into(),
            gas: "0x5208".into(),
            gas_price: Some("0x2540be400".into()),
            ..Default::default()
        };
        let err = api.submit(sub).unwrap_err();
        assert_eq!(err.code, crate::error_code::TRANSACTION_REJECTED);
        assert!(err.message.contains("insufficient funds"));
    }

    #[tokio::test]
    async fn test_metrics_snapshot_exposed() {
        let api = api();
        api.submit(submission(0, 10 * GWEI, "0x0000000000000000000000000000000000051095", 1))
            .unwrap();

        let response = api.dispatch(PoolRequest::Metrics).await.unwrap();
        let PoolResponse::Metrics(snapshot) = response else {
            panic!("expected metrics");
        };
        assert_eq!(snapshot.counters.get("txpool.accepted"), Some(&1));
        assert_eq!(snapshot.gauges.get("txpool.pending"), Some(&1));
    }
}

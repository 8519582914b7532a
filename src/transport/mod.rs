#[cfg(feature = "memory")]
pub mod memory;

use async_trait::async_trait;

use crate::error::TaskResult;

/// Message-transport collaborator.
///
/// Topics are opaque string identifiers; serialized activations are the
/// payload unit published to them. Delivery is unordered and
/// at-least-once - never exactly-once. Topic creation, partitioning and
/// consumer-group management belong to the implementation, not to this
/// contract.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Publish a payload to `topic`
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> TaskResult<()>;

    /// Take the next payload from `topic`, if any
    async fn consume(&self, topic: &str) -> TaskResult<Option<Vec<u8>>>;
}

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::Transport;
use crate::error::TaskResult;

/// In-memory transport for testing and development
#[derive(Default)]
pub struct MemoryTransport {
    topics: RwLock<HashMap<String, VecDeque<Vec<u8>>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of payloads waiting on `topic`
    pub fn depth(&self, topic: &str) -> usize {
        self.topics.read().get(topic).map_or(0, |queue| queue.len())
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> TaskResult<()> {
        self.topics
            .write()
            .entry(topic.to_string())
            .or_default()
            .push_back(payload);
        Ok(())
    }

    async fn consume(&self, topic: &str) -> TaskResult<Option<Vec<u8>>> {
        Ok(self
            .topics
            .write()
            .get_mut(topic)
            .and_then(|queue| queue.pop_front()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_consume_fifo() {
        let transport = MemoryTransport::new();

        transport.publish("tests", b"one".to_vec()).await.unwrap();
        transport.publish("tests", b"two".to_vec()).await.unwrap();
        assert_eq!(transport.depth("tests"), 2);

        assert_eq!(transport.consume("tests").await.unwrap(), Some(b"one".to_vec()));
        assert_eq!(transport.consume("tests").await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(transport.consume("tests").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_topics_are_isolated() {
        let transport = MemoryTransport::new();

        transport.publish("a", b"payload".to_vec()).await.unwrap();
        assert_eq!(transport.depth("a"), 1);
        assert_eq!(transport.depth("b"), 0);
        assert_eq!(transport.consume("b").await.unwrap(), None);
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use super::DispatchBackend;
use crate::error::TaskResult;
use crate::task::Task;
use crate::transport::Transport;
use crate::types::{Activation, EventHub, TaskEvent};

/// Production dispatch path: serialize the activation and publish it to
/// the namespace topic for an out-of-process worker.
///
/// Submit is fire-and-forget with at-least-once delivery downstream; no
/// execution outcome flows back to the caller.
pub struct DeferredBackend {
    transport: Arc<dyn Transport>,
    events: Option<EventHub>,
}

impl DeferredBackend {
    /// Create a deferred backend publishing through `transport`
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            events: None,
        }
    }

    /// Emit a [`TaskEvent::Submitted`] for every accepted activation
    pub fn with_events(mut self, events: EventHub) -> Self {
        self.events = Some(events);
        self
    }
}

#[async_trait]
impl DispatchBackend for DeferredBackend {
    async fn submit(&self, task: &Task, activation: Activation) -> TaskResult<()> {
        let payload = activation.to_bytes()?;
        self.transport.publish(task.topic(), payload).await?;

        if let Some(events) = &self.events {
            events.emit(TaskEvent::Submitted {
                id: activation.id.clone(),
                namespace: activation.namespace.clone(),
                taskname: activation.taskname.clone(),
                topic: task.topic().to_string(),
                at: Utc::now(),
            });
        }

        info!(
            "Submitted activation {} for task {} to {}",
            activation.id,
            task.name(),
            task.topic()
        );
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "deferred"
    }
}

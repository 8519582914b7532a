use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::ActivationId;

/// Minimal stable event protocol for structured observability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TaskEvent {
    /// Activation was submitted to a topic
    Submitted {
        id: ActivationId,
        namespace: String,
        taskname: String,
        topic: String,
        at: DateTime<Utc>,
    },

    /// Activation executed successfully
    Completed {
        id: ActivationId,
        namespace: String,
        taskname: String,
        at: DateTime<Utc>,
    },

    /// Activation failed and was re-enqueued for another attempt
    Retrying {
        id: ActivationId,
        taskname: String,
        attempts: u32,
        error: String,
        at: DateTime<Utc>,
    },

    /// Activation exhausted its retry budget and was routed to deadletter
    Deadlettered {
        id: ActivationId,
        taskname: String,
        error: String,
        at: DateTime<Utc>,
    },

    /// Activation exhausted its attempt budget and was dropped
    Discarded {
        id: ActivationId,
        taskname: String,
        at: DateTime<Utc>,
    },

    /// Activation named a task absent from the registry
    UnknownTask {
        namespace: String,
        taskname: String,
        at: DateTime<Utc>,
    },
}

impl TaskEvent {
    /// Get event type name as string
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Submitted { .. } => "submitted",
            Self::Completed { .. } => "completed",
            Self::Retrying { .. } => "retrying",
            Self::Deadlettered { .. } => "deadlettered",
            Self::Discarded { .. } => "discarded",
            Self::UnknownTask { .. } => "unknown_task",
        }
    }
}

/// Broadcast hub for [`TaskEvent`]s.
///
/// Cloneable handle shared between the dispatch side and workers. Events
/// are dropped when no subscriber is listening.
#[derive(Clone)]
pub struct EventHub {
    sender: broadcast::Sender<TaskEvent>,
}

impl EventHub {
    /// Create a hub with the default buffer capacity
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1000);
        Self { sender }
    }

    /// Subscribe to events emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.sender.subscribe()
    }

    /// Emit an event to all current subscribers
    pub fn emit(&self, event: TaskEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

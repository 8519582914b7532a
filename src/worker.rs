use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{ExecutionError, TaskError, TaskResult};
use crate::namespace::TaskNamespace;
use crate::registry::TaskRegistry;
use crate::task::Task;
use crate::transport::Transport;
use crate::types::{Activation, EventHub, TaskEvent};

/// What happens to an activation after a failed attempt
#[derive(Debug)]
pub enum NextAction {
    /// Re-enqueue the next-attempt envelope to the namespace topic
    Retry(Activation),

    /// Route the exhausted envelope to the deadletter topic
    Deadletter,

    /// Drop the envelope silently
    Discard,
}

/// Decide the fate of `activation` after a failed attempt.
///
/// Consult-then-advance: while attempts remain the next-attempt envelope
/// is re-enqueued; once exhausted, lineages with deadletter routing go to
/// the deadletter topic and the rest are discarded.
pub fn failure_action(task: &Task, activation: &Activation, error: &ExecutionError) -> NextAction {
    if task.should_retry(&activation.retry_state, error) {
        return NextAction::Retry(activation.next_attempt());
    }
    if activation.retry_state.deadletter_enabled() {
        NextAction::Deadletter
    } else {
        NextAction::Discard
    }
}

/// Consumes activations from namespace topics and executes them,
/// honoring the retry/deadletter contract carried in each envelope.
pub struct Worker {
    registry: Arc<TaskRegistry>,
    transport: Arc<dyn Transport>,
    events: Option<EventHub>,
}

impl Worker {
    /// Create a worker resolving tasks through `registry` and consuming
    /// from `transport`
    pub fn new(registry: Arc<TaskRegistry>, transport: Arc<dyn Transport>) -> Self {
        Self {
            registry,
            transport,
            events: None,
        }
    }

    /// Emit a [`TaskEvent`] for every processed activation
    pub fn with_events(mut self, events: EventHub) -> Self {
        self.events = Some(events);
        self
    }

    /// Consume and process at most one activation from the namespace
    /// topic. Returns false when the topic is empty.
    pub async fn process_one(&self, namespace: &str) -> TaskResult<bool> {
        let namespace = self.registry.namespace(namespace)?;
        let payload = match self.transport.consume(namespace.topic()).await? {
            Some(payload) => payload,
            None => return Ok(false),
        };

        match Activation::from_bytes(&payload) {
            Ok(activation) => self.process_activation(&namespace, activation).await?,
            Err(e) => {
                // Undecodable payloads cannot be retried; keep them for
                // inspection instead of dropping them.
                error!("Malformed payload on {}: {}", namespace.topic(), e);
                self.transport
                    .publish(namespace.deadletter_topic(), payload)
                    .await?;
            }
        }
        Ok(true)
    }

    async fn process_activation(
        &self,
        namespace: &TaskNamespace,
        activation: Activation,
    ) -> TaskResult<()> {
        let task = match self
            .registry
            .resolve(&activation.namespace, &activation.taskname)
        {
            Ok(task) => task,
            Err(e) => {
                // Deploy skew or a malformed message. Never retried;
                // routed straight to deadletter for alerting.
                error!("Cannot dispatch activation {}: {}", activation.id, e);
                self.emit(TaskEvent::UnknownTask {
                    namespace: activation.namespace.clone(),
                    taskname: activation.taskname.clone(),
                    at: Utc::now(),
                });
                self.transport
                    .publish(namespace.deadletter_topic(), activation.to_bytes()?)
                    .await?;
                return Ok(());
            }
        };

        let result = if activation.is_expired(Utc::now()) {
            // Skip execution; an expired envelope counts as a failed
            // attempt and feeds the same retry/deadletter decision.
            Err(ExecutionError::retryable("execution deadline exceeded"))
        } else {
            task.invoke(activation.parameters.clone()).await
        };

        match result {
            Ok(()) => {
                info!("Activation {} for task {} completed", activation.id, task.name());
                self.emit(TaskEvent::Completed {
                    id: activation.id.clone(),
                    namespace: activation.namespace.clone(),
                    taskname: activation.taskname.clone(),
                    at: Utc::now(),
                });
            }
            Err(err) => {
                if err.is_retryable() {
                    warn!("Task {} failed: {}", task.name(), err);
                } else {
                    error!("Task {} failed permanently: {}", task.name(), err);
                }

                match failure_action(&task, &activation, &err) {
                    NextAction::Retry(next) => {
                        self.transport
                            .publish(namespace.topic(), next.to_bytes()?)
                            .await?;
                        self.emit(TaskEvent::Retrying {
                            id: next.id.clone(),
                            taskname: next.taskname.clone(),
                            attempts: next.retry_state.attempts,
                            error: err.to_string(),
                            at: Utc::now(),
                        });
                    }
                    NextAction::Deadletter => {
                        self.transport
                            .publish(namespace.deadletter_topic(), activation.to_bytes()?)
                            .await?;
                        warn!(
                            "Activation {} for task {} routed to {}",
                            activation.id,
                            task.name(),
                            namespace.deadletter_topic()
                        );
                        self.emit(TaskEvent::Deadlettered {
                            id: activation.id.clone(),
                            taskname: activation.taskname.clone(),
                            error: err.to_string(),
                            at: Utc::now(),
                        });
                    }
                    NextAction::Discard => {
                        debug!(
                            "Discarding activation {} after {} attempts",
                            activation.id,
                            activation.retry_state.attempts + 1
                        );
                        self.emit(TaskEvent::Discarded {
                            id: activation.id.clone(),
                            taskname: activation.taskname.clone(),
                            at: Utc::now(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn emit(&self, event: TaskEvent) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }

    /// Run a processing loop for `namespace` until shutdown is requested
    pub fn spawn(self: Arc<Self>, namespace: impl Into<String>) -> WorkerHandle {
        let namespace = namespace.into();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let worker = self;
        let join_handle = tokio::spawn(async move {
            info!("Worker started for namespace {}", namespace);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        info!("Worker shutdown requested");
                        break;
                    }

                    result = worker.process_one(&namespace) => {
                        match result {
                            Ok(processed) => {
                                if !processed {
                                    // Topic empty, wait a bit.
                                    tokio::time::sleep(Duration::from_millis(50)).await;
                                }
                            }
                            Err(e) => {
                                error!("Error processing activation: {}", e);
                                tokio::time::sleep(Duration::from_millis(250)).await;
                            }
                        }
                    }
                }
            }

            info!("Worker stopped");
            Ok(())
        });

        WorkerHandle {
            shutdown_tx,
            join_handle,
        }
    }
}

/// Handle for managing a spawned worker's lifecycle
pub struct WorkerHandle {
    shutdown_tx: oneshot::Sender<()>,
    join_handle: JoinHandle<TaskResult<()>>,
}

impl WorkerHandle {
    /// Gracefully shut the worker down
    pub async fn shutdown(self) -> TaskResult<()> {
        let _ = self.shutdown_tx.send(());
        self.join_handle
            .await
            .map_err(|e| TaskError::Internal(format!("Worker join error: {}", e)))?
    }
}

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::dispatch::Dispatcher;
use crate::error::{ExecutionError, TaskResult};
use crate::retry::{RetryPolicy, RetryState};
use crate::types::{Activation, ActivationId, TaskParameters};

/// Type-erased unit of work bound to a task name.
///
/// Implemented directly for handler structs, or through [`FnTask`] for
/// async closures and functions.
#[async_trait]
pub trait TaskFunction: Send + Sync {
    /// Execute with the decoded activation parameters
    async fn call(&self, params: TaskParameters) -> Result<(), ExecutionError>;
}

/// Adapter implementing [`TaskFunction`] for async closures and functions
pub struct FnTask<F>(pub F);

#[async_trait]
impl<F, Fut> TaskFunction for FnTask<F>
where
    F: Fn(TaskParameters) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ExecutionError>> + Send + 'static,
{
    async fn call(&self, params: TaskParameters) -> Result<(), ExecutionError> {
        (self.0)(params).await
    }
}

/// Execution-time budget for a task, relative or absolute.
///
/// Relative budgets are resolved to an absolute epoch-seconds timestamp
/// when the activation is created, so the consuming worker needs no
/// enqueue-side clock context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskDeadline {
    /// Budget relative to activation-creation time
    Duration(Duration),

    /// Fixed point in time
    At(DateTime<Utc>),
}

impl TaskDeadline {
    fn timestamp(&self, now: DateTime<Utc>) -> i64 {
        match self {
            Self::Duration(budget) => now.timestamp() + budget.as_secs() as i64,
            Self::At(at) => at.timestamp(),
        }
    }
}

impl From<Duration> for TaskDeadline {
    fn from(budget: Duration) -> Self {
        Self::Duration(budget)
    }
}

impl From<DateTime<Utc>> for TaskDeadline {
    fn from(at: DateTime<Utc>) -> Self {
        Self::At(at)
    }
}

/// Registration-time configuration for a task
#[derive(Debug, Clone)]
pub struct TaskConfig {
    pub(crate) name: String,
    pub(crate) retry: Option<RetryPolicy>,
    pub(crate) deadline: Option<TaskDeadline>,
    pub(crate) idempotent: bool,
}

impl TaskConfig {
    /// Configure a task under `name`. The name routes activations and is
    /// persisted in envelopes consumed later, so it must stay stable
    /// across deploys.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            retry: None,
            deadline: None,
            idempotent: false,
        }
    }

    /// Override the namespace default retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Set an execution-time budget
    pub fn with_deadline(mut self, deadline: impl Into<TaskDeadline>) -> Self {
        self.deadline = Some(deadline.into());
        self
    }

    /// Hint that re-execution produces no unsafe duplicate side effects
    pub fn idempotent(mut self, idempotent: bool) -> Self {
        self.idempotent = idempotent;
        self
    }
}

/// A named, registered unit of work - the primary handle developers use
/// to enqueue work.
///
/// Registered once into its namespace at startup and immutable afterward;
/// invoked many times. The effective retry policy (task override or
/// namespace default) is resolved at registration time.
pub struct Task {
    name: String,
    namespace: String,
    topic: String,
    deadletter_topic: String,
    func: Arc<dyn TaskFunction>,
    retry: Option<RetryPolicy>,
    idempotent: bool,
    deadline: Option<TaskDeadline>,
    dispatcher: Arc<Dispatcher>,
}

impl Task {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        namespace: String,
        topic: String,
        deadletter_topic: String,
        func: Arc<dyn TaskFunction>,
        retry: Option<RetryPolicy>,
        idempotent: bool,
        deadline: Option<TaskDeadline>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            name,
            namespace,
            topic,
            deadletter_topic,
            func,
            retry,
            idempotent,
            deadline,
            dispatcher,
        }
    }

    /// Registered task name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the owning namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Topic activations for this task are published to
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Topic exhausted activations are routed to
    pub fn deadletter_topic(&self) -> &str {
        &self.deadletter_topic
    }

    /// Effective retry policy, if any
    pub fn retry(&self) -> Option<RetryPolicy> {
        self.retry
    }

    /// Whether re-execution is safe
    pub fn idempotent(&self) -> bool {
        self.idempotent
    }

    /// Configured execution-time budget, if any
    pub fn deadline(&self) -> Option<TaskDeadline> {
        self.deadline
    }

    /// Build the wire envelope for one invocation. Pure construction;
    /// does not dispatch.
    pub fn create_activation(&self, parameters: TaskParameters) -> Activation {
        let now = Utc::now();
        let retry_state = match self.retry {
            Some(policy) => policy.initial_state(),
            None => RetryState::single_attempt(),
        };

        Activation {
            id: ActivationId::new(),
            taskname: self.name.clone(),
            namespace: self.namespace.clone(),
            parameters,
            retry_state,
            deadline_timestamp: self.deadline.map(|deadline| deadline.timestamp(now)),
            received_at: now,
        }
    }

    /// Convenience alias for [`Task::apply_async`]
    pub async fn delay(&self, parameters: TaskParameters) -> TaskResult<()> {
        self.apply_async(parameters).await
    }

    /// Build an activation and hand it to the active dispatch backend.
    ///
    /// Fire-and-forget: no confirmation of eventual success or failure is
    /// returned. Outcomes are observable through the deadletter topic,
    /// events and logs. Within an immediate dispatch scope the task runs
    /// before this call returns and execution errors surface here.
    #[instrument(skip(self, parameters), fields(taskname = %self.name, namespace = %self.namespace))]
    pub async fn apply_async(&self, parameters: TaskParameters) -> TaskResult<()> {
        let activation = self.create_activation(parameters);
        self.dispatcher.current().submit(self, activation).await
    }

    /// Attempt-count-only retry decision: true iff a retry policy is
    /// attached and attempts remain. The error is accepted for interface
    /// symmetry; error kinds do not change the outcome.
    pub fn should_retry(&self, state: &RetryState, _error: &ExecutionError) -> bool {
        match self.retry {
            Some(policy) => policy.should_retry(state),
            None => false,
        }
    }

    /// Execute the underlying function. Used by dispatch backends and by
    /// workers consuming activations.
    pub async fn invoke(&self, parameters: TaskParameters) -> Result<(), ExecutionError> {
        self.func.call(parameters).await
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("retry", &self.retry)
            .field("idempotent", &self.idempotent)
            .field("deadline", &self.deadline)
            .finish()
    }
}

use async_trait::async_trait;
use tracing::debug;

use super::DispatchBackend;
use crate::error::{TaskError, TaskResult};
use crate::task::Task;
use crate::types::Activation;

/// Test-mode dispatch path: execute the task function in the caller's
/// thread of control before the enqueue call returns.
///
/// Enabled for a bounded extent through [`Dispatcher::immediate_scope`]
/// so production code paths are unaffected outside tests. Execution
/// errors surface to the caller, and deadlines are not enforced.
///
/// [`Dispatcher::immediate_scope`]: super::Dispatcher::immediate_scope
pub struct ImmediateBackend;

impl ImmediateBackend {
    /// Create an immediate backend
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImmediateBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DispatchBackend for ImmediateBackend {
    async fn submit(&self, task: &Task, activation: Activation) -> TaskResult<()> {
        debug!("Executing task {} immediately", task.name());
        task.invoke(activation.parameters)
            .await
            .map_err(TaskError::ExecutionFailed)
    }

    fn backend_name(&self) -> &'static str {
        "immediate"
    }
}

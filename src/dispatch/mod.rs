pub mod deferred;
pub mod immediate;

pub use deferred::DeferredBackend;
pub use immediate::ImmediateBackend;

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::TaskResult;
use crate::task::Task;
use crate::types::Activation;

/// Strategy for handing a freshly built activation off for execution
#[async_trait]
pub trait DispatchBackend: Send + Sync {
    /// Submit an activation built from `task`. Deferred backends publish
    /// to the task's topic and return immediately; the immediate backend
    /// executes in place before returning.
    async fn submit(&self, task: &Task, activation: Activation) -> TaskResult<()>;

    /// Backend identifier for logging
    fn backend_name(&self) -> &'static str;
}

/// Routes enqueues to the active dispatch backend.
///
/// The default backend handles production dispatch; [`Dispatcher::scoped`]
/// pushes an override that stays active until the returned guard drops.
/// Each registry carries its own dispatcher, so scoped overrides in
/// concurrent test runs do not interfere.
pub struct Dispatcher {
    default_backend: Arc<dyn DispatchBackend>,
    overrides: RwLock<Vec<Arc<dyn DispatchBackend>>>,
}

impl Dispatcher {
    /// Create a dispatcher with `backend` as the default
    pub fn new(backend: Arc<dyn DispatchBackend>) -> Self {
        Self {
            default_backend: backend,
            overrides: RwLock::new(Vec::new()),
        }
    }

    /// The currently active backend
    pub fn current(&self) -> Arc<dyn DispatchBackend> {
        self.overrides
            .read()
            .last()
            .cloned()
            .unwrap_or_else(|| self.default_backend.clone())
    }

    /// Route enqueues through `backend` until the returned guard drops
    pub fn scoped(&self, backend: Arc<dyn DispatchBackend>) -> DispatchScope<'_> {
        self.overrides.write().push(backend);
        DispatchScope { dispatcher: self }
    }

    /// Execute tasks synchronously in the caller's thread of control
    /// until the returned guard drops. Test mode; production code paths
    /// are unaffected outside the scope.
    pub fn immediate_scope(&self) -> DispatchScope<'_> {
        self.scoped(Arc::new(ImmediateBackend::new()))
    }
}

/// Guard restoring the previously active backend on drop
#[must_use = "the override ends when the scope guard is dropped"]
pub struct DispatchScope<'a> {
    dispatcher: &'a Dispatcher,
}

impl Drop for DispatchScope<'_> {
    fn drop(&mut self) {
        self.dispatcher.overrides.write().pop();
    }
}

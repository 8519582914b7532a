//! # taskwire: Distributed Task-Execution Core
//!
//! **Task namespaces, retry policies, and a durable activation envelope**
//!
//! taskwire converts a function call into a replayable unit of work - an
//! [`Activation`] - dispatched through a message topic and consumed by an
//! out-of-process worker, with deadletter handling for work that
//! exhausts its retry budget:
//!
//! - **Namespaced registry**: tasks grouped under a topic, a deadletter
//!   topic and a default retry policy, with worker-side lookup by
//!   `namespace` + `taskname` alone
//! - **Retry state machines**: attempt counters carried in the envelope,
//!   advanced by the consuming worker, routing exhausted work to
//!   deadletter or discarding it
//! - **Self-describing envelopes**: call parameters serialized at
//!   enqueue time, so representation errors surface to the caller
//! - **Swappable dispatch**: a deferred production path publishing to
//!   the namespace topic, and a scoped immediate path executing
//!   synchronously for deterministic tests
//! - **Structured observability**: tracing spans plus a broadcast event
//!   protocol covering the full envelope lifecycle
//!
//! ## 🚀 Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskwire::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> TaskResult<()> {
//! let transport = Arc::new(MemoryTransport::new());
//! let dispatcher = Arc::new(Dispatcher::new(Arc::new(DeferredBackend::new(
//!     transport.clone(),
//! ))));
//! let registry = Arc::new(TaskRegistry::new(dispatcher));
//!
//! let emails = registry.create_namespace(
//!     NamespaceConfig::new("emails")
//!         .with_default_retry(RetryPolicy::new(3).with_deadletter(true)),
//! )?;
//!
//! let send_email = emails.register(
//!     TaskConfig::new("emails.send"),
//!     FnTask(|params: TaskParameters| async move {
//!         let address: String = params.get_kwarg("address")?;
//!         // ... deliver ...
//!         Ok(())
//!     }),
//! )?;
//!
//! // Fire-and-forget: builds an activation and publishes it to the
//! // namespace topic for a worker to consume.
//! send_email
//!     .apply_async(TaskParameters::new().kwarg("address", "user@example.com")?)
//!     .await?;
//!
//! let worker = Arc::new(Worker::new(registry.clone(), transport.clone()));
//! worker.process_one("emails").await?;
//! # Ok(())
//! # }
//! ```

pub mod dispatch;
pub mod error;
pub mod namespace;
pub mod registry;
pub mod retry;
pub mod task;
pub mod transport;
pub mod types;
pub mod worker;

// Core API exports
pub use dispatch::{DeferredBackend, DispatchBackend, DispatchScope, Dispatcher, ImmediateBackend};
pub use error::{ExecutionError, TaskError, TaskResult};
pub use namespace::{NamespaceConfig, TaskNamespace};
pub use registry::TaskRegistry;
pub use retry::{RetryPolicy, RetryState};
pub use task::{FnTask, Task, TaskConfig, TaskDeadline, TaskFunction};
pub use transport::Transport;
pub use types::{Activation, ActivationId, EventHub, TaskEvent, TaskParameters};
pub use worker::{failure_action, NextAction, Worker, WorkerHandle};

#[cfg(feature = "memory")]
pub use transport::memory::MemoryTransport;

/// Prelude for wiring up registries, tasks and workers
pub mod prelude {
    pub use crate::{
        DeferredBackend, Dispatcher, FnTask, NamespaceConfig, RetryPolicy, TaskConfig,
        TaskParameters, TaskRegistry, Worker,
    };

    pub use crate::{ExecutionError, TaskError, TaskResult};

    #[cfg(feature = "memory")]
    pub use crate::MemoryTransport;

    // Essential traits
    pub use crate::{DispatchBackend, TaskFunction, Transport};
    pub use async_trait::async_trait;
}

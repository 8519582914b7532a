use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::dispatch::Dispatcher;
use crate::error::{TaskError, TaskResult};
use crate::retry::RetryPolicy;
use crate::task::{Task, TaskConfig, TaskFunction};

/// Configuration for a task namespace.
///
/// The topic defaults to the namespace name and the deadletter topic to
/// `<name>-dlq`; both can be overridden.
#[derive(Debug, Clone)]
pub struct NamespaceConfig {
    pub(crate) name: String,
    pub(crate) topic: String,
    pub(crate) deadletter_topic: String,
    pub(crate) default_retry: Option<RetryPolicy>,
}

impl NamespaceConfig {
    /// Configure a namespace under `name`
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            topic: name.clone(),
            deadletter_topic: format!("{}-dlq", name),
            name,
            default_retry: None,
        }
    }

    /// Override the destination topic
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Override the deadletter topic
    pub fn with_deadletter_topic(mut self, topic: impl Into<String>) -> Self {
        self.deadletter_topic = topic.into();
        self
    }

    /// Default retry policy inherited by member tasks without an override
    pub fn with_default_retry(mut self, retry: RetryPolicy) -> Self {
        self.default_retry = Some(retry);
        self
    }
}

/// A named grouping of related tasks.
///
/// A namespace ties its member tasks to one destination topic, one
/// deadletter topic and a default retry policy. All tasks within a
/// namespace are stored in the same topic and run by a shared worker
/// pool. Created once at startup through a [`TaskRegistry`]; long-lived.
///
/// [`TaskRegistry`]: crate::registry::TaskRegistry
pub struct TaskNamespace {
    name: String,
    topic: String,
    deadletter_topic: String,
    default_retry: Option<RetryPolicy>,
    tasks: RwLock<HashMap<String, Arc<Task>>>,
    dispatcher: Arc<Dispatcher>,
}

impl TaskNamespace {
    pub(crate) fn new(config: NamespaceConfig, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            name: config.name,
            topic: config.topic,
            deadletter_topic: config.deadletter_topic,
            default_retry: config.default_retry,
            tasks: RwLock::new(HashMap::new()),
            dispatcher,
        }
    }

    /// Namespace name, used as a tag in every activation
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Destination topic for normal dispatch
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Destination topic for exhausted-retry work
    pub fn deadletter_topic(&self) -> &str {
        &self.deadletter_topic
    }

    /// Default retry policy inherited by member tasks
    pub fn default_retry(&self) -> Option<RetryPolicy> {
        self.default_retry
    }

    /// Register a task under a unique name within this namespace.
    ///
    /// Registration is expected to happen during single-threaded startup
    /// before concurrent dispatch begins; a name collision is a
    /// programming error surfaced as [`TaskError::DuplicateTaskName`].
    pub fn register<F>(&self, config: TaskConfig, func: F) -> TaskResult<Arc<Task>>
    where
        F: TaskFunction + 'static,
    {
        let mut tasks = self.tasks.write();
        if tasks.contains_key(&config.name) {
            return Err(TaskError::DuplicateTaskName {
                namespace: self.name.clone(),
                name: config.name,
            });
        }

        let retry = config.retry.or(self.default_retry);
        let task = Arc::new(Task::new(
            config.name.clone(),
            self.name.clone(),
            self.topic.clone(),
            self.deadletter_topic.clone(),
            Arc::new(func),
            retry,
            config.idempotent,
            config.deadline,
            self.dispatcher.clone(),
        ));
        tasks.insert(config.name, task.clone());

        info!("Registered task {} in namespace {}", task.name(), self.name);
        Ok(task)
    }

    /// Look up a task by name for worker-side dispatch
    pub fn get(&self, name: &str) -> TaskResult<Arc<Task>> {
        self.tasks.read().get(name).cloned().ok_or_else(|| TaskError::UnknownTask {
            namespace: self.name.clone(),
            name: name.to_string(),
        })
    }

    /// Check if a task name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.tasks.read().contains_key(name)
    }

    /// Get all registered task names
    pub fn registered_tasks(&self) -> Vec<String> {
        self.tasks.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::DeferredBackend;
    use crate::error::ExecutionError;
    use crate::registry::TaskRegistry;
    use crate::task::FnTask;
    use crate::transport::memory::MemoryTransport;
    use crate::types::TaskParameters;

    fn test_registry() -> Arc<TaskRegistry> {
        let transport = Arc::new(MemoryTransport::new());
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(DeferredBackend::new(transport))));
        Arc::new(TaskRegistry::new(dispatcher))
    }

    fn noop() -> FnTask<impl Fn(TaskParameters) -> std::future::Ready<Result<(), ExecutionError>> + Send + Sync>
    {
        FnTask(|_params: TaskParameters| std::future::ready(Ok(())))
    }

    #[test]
    fn test_register_task() {
        let registry = test_registry();
        let namespace = registry
            .create_namespace(
                NamespaceConfig::new("tests")
                    .with_topic("tests")
                    .with_deadletter_topic("tests-dlq"),
            )
            .unwrap();

        namespace
            .register(TaskConfig::new("tests.simple_task"), noop())
            .unwrap();

        assert!(namespace.default_retry().is_none());
        assert!(namespace.contains("tests.simple_task"));
        assert!(!namespace.contains("nope"));

        let task = namespace.get("tests.simple_task").unwrap();
        assert_eq!(task.name(), "tests.simple_task");
        assert_eq!(task.topic(), "tests");
        assert_eq!(task.deadletter_topic(), "tests-dlq");
    }

    #[test]
    fn test_register_inherits_default_retry() {
        let registry = test_registry();
        let default_retry = RetryPolicy::new(5);
        let namespace = registry
            .create_namespace(NamespaceConfig::new("tests").with_default_retry(default_retry))
            .unwrap();

        let inherited = namespace
            .register(TaskConfig::new("test.no_retry_param"), noop())
            .unwrap();
        assert_eq!(inherited.retry(), Some(default_retry));

        let retry = RetryPolicy::new(2).with_deadletter(true);
        let overridden = namespace
            .register(TaskConfig::new("test.with_retry_param").with_retry(retry), noop())
            .unwrap();
        assert_eq!(overridden.retry(), Some(retry));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = test_registry();
        let namespace = registry.create_namespace(NamespaceConfig::new("tests")).unwrap();

        namespace.register(TaskConfig::new("tests.dupe"), noop()).unwrap();
        let result = namespace.register(TaskConfig::new("tests.dupe"), noop());

        assert!(matches!(result, Err(TaskError::DuplicateTaskName { .. })));
    }

    #[test]
    fn test_same_name_in_two_namespaces() {
        let registry = test_registry();
        let first = registry.create_namespace(NamespaceConfig::new("first")).unwrap();
        let second = registry.create_namespace(NamespaceConfig::new("second")).unwrap();

        first.register(TaskConfig::new("shared.name"), noop()).unwrap();
        second.register(TaskConfig::new("shared.name"), noop()).unwrap();

        assert!(first.contains("shared.name"));
        assert!(second.contains("shared.name"));
    }

    #[test]
    fn test_get_unknown() {
        let registry = test_registry();
        let namespace = registry.create_namespace(NamespaceConfig::new("tests")).unwrap();

        let err = namespace.get("nope").unwrap_err();
        assert!(matches!(err, TaskError::UnknownTask { .. }));
        assert!(err.to_string().contains("No task registered"));
    }

    #[test]
    fn test_default_topics() {
        let registry = test_registry();
        let namespace = registry.create_namespace(NamespaceConfig::new("emails")).unwrap();

        assert_eq!(namespace.topic(), "emails");
        assert_eq!(namespace.deadletter_topic(), "emails-dlq");
    }
}

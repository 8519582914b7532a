use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::dispatch::Dispatcher;
use crate::error::{TaskError, TaskResult};
use crate::namespace::{NamespaceConfig, TaskNamespace};
use crate::task::Task;

/// Explicit registry of task namespaces.
///
/// Constructor-injected rather than process-global, so independent
/// registries can coexist without cross-contamination. Namespaces are
/// created during startup and looked up by workers resolving activation
/// envelopes.
pub struct TaskRegistry {
    namespaces: RwLock<HashMap<String, Arc<TaskNamespace>>>,
    dispatcher: Arc<Dispatcher>,
}

impl TaskRegistry {
    /// Create a registry whose namespaces dispatch through `dispatcher`
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
            dispatcher,
        }
    }

    /// The dispatcher shared by this registry's namespaces
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Create and register a namespace
    pub fn create_namespace(&self, config: NamespaceConfig) -> TaskResult<Arc<TaskNamespace>> {
        let mut namespaces = self.namespaces.write();
        if namespaces.contains_key(&config.name) {
            return Err(TaskError::DuplicateNamespace(config.name));
        }

        let namespace = Arc::new(TaskNamespace::new(config, self.dispatcher.clone()));
        namespaces.insert(namespace.name().to_string(), namespace.clone());
        Ok(namespace)
    }

    /// Look up a namespace by name
    pub fn namespace(&self, name: &str) -> TaskResult<Arc<TaskNamespace>> {
        self.namespaces
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| TaskError::UnknownNamespace(name.to_string()))
    }

    /// Check if a namespace is registered
    pub fn contains(&self, name: &str) -> bool {
        self.namespaces.read().contains_key(name)
    }

    /// Worker-side lookup: locate a task purely from the coordinates
    /// carried in an activation envelope.
    pub fn resolve(&self, namespace: &str, taskname: &str) -> TaskResult<Arc<Task>> {
        self.namespace(namespace)?.get(taskname)
    }
}

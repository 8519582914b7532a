use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ExecutionError, TaskResult};

/// Call parameters serialized into the activation envelope.
///
/// Positional and keyword values are stored in wire form, so values that
/// cannot be represented in the wire format are rejected at build time on
/// the enqueuing side rather than on a worker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskParameters {
    /// Positional arguments, in call order
    pub args: Vec<Value>,

    /// Keyword arguments
    pub kwargs: Map<String, Value>,
}

impl TaskParameters {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument. Fails if the value is not
    /// representable in the wire format.
    pub fn arg<T: Serialize>(mut self, value: T) -> TaskResult<Self> {
        self.args.push(serde_json::to_value(value)?);
        Ok(self)
    }

    /// Set a keyword argument. Fails if the value is not representable in
    /// the wire format.
    pub fn kwarg<T: Serialize>(mut self, name: impl Into<String>, value: T) -> TaskResult<Self> {
        self.kwargs.insert(name.into(), serde_json::to_value(value)?);
        Ok(self)
    }

    /// Decode the positional argument at `index`
    pub fn get_arg<T: DeserializeOwned>(&self, index: usize) -> Result<T, ExecutionError> {
        let value = self.args.get(index).ok_or_else(|| {
            ExecutionError::permanent(format!("Missing positional argument {}", index))
        })?;
        serde_json::from_value(value.clone()).map_err(|e| {
            ExecutionError::permanent(format!("Invalid positional argument {}: {}", index, e))
        })
    }

    /// Decode the keyword argument named `name`
    pub fn get_kwarg<T: DeserializeOwned>(&self, name: &str) -> Result<T, ExecutionError> {
        let value = self
            .kwargs
            .get(name)
            .ok_or_else(|| ExecutionError::permanent(format!("Missing keyword argument '{}'", name)))?;
        serde_json::from_value(value.clone())
            .map_err(|e| ExecutionError::permanent(format!("Invalid keyword argument '{}': {}", name, e)))
    }

    /// Check whether no arguments were provided
    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ActivationId, TaskParameters};
use crate::error::TaskResult;
use crate::retry::RetryState;

/// Immutable wire envelope for one task invocation.
///
/// Fully self-describing: a worker locates the task from `namespace` +
/// `taskname`, decodes `parameters`, and executes without any other
/// enqueue-side context. Created fresh on every enqueue; retry
/// re-delivery builds a new envelope with the advanced [`RetryState`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activation {
    /// Unique identifier, stable across retry re-deliveries
    pub id: ActivationId,

    /// Registered task name, used for worker-side function lookup
    pub taskname: String,

    /// Owning namespace name, not an object reference
    pub namespace: String,

    /// Serialized call parameters
    pub parameters: TaskParameters,

    /// Retry counters for this execution lineage
    pub retry_state: RetryState,

    /// Absolute execution deadline in epoch seconds, if any
    pub deadline_timestamp: Option<i64>,

    /// When this envelope was built
    pub received_at: DateTime<Utc>,
}

impl Activation {
    /// Encode to the wire format
    pub fn to_bytes(&self) -> TaskResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode from the wire format
    pub fn from_bytes(bytes: &[u8]) -> TaskResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Whether the execution deadline has passed at `now`. An expired
    /// envelope is skipped by the worker and treated as a failed attempt.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.deadline_timestamp {
            Some(deadline) => now.timestamp() > deadline,
            None => false,
        }
    }

    /// Envelope for the next delivery attempt: same id and parameters,
    /// advanced retry counters, fresh delivery timestamp.
    pub fn next_attempt(&self) -> Self {
        Self {
            retry_state: self.retry_state.next_attempt(),
            received_at: Utc::now(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_activation() -> Activation {
        Activation {
            id: ActivationId::new(),
            taskname: "tests.sample".to_string(),
            namespace: "tests".to_string(),
            parameters: TaskParameters::new()
                .arg("one")
                .unwrap()
                .kwarg("org_id", 99)
                .unwrap(),
            retry_state: RetryState::single_attempt(),
            deadline_timestamp: Some(Utc::now().timestamp() + 600),
            received_at: Utc::now(),
        }
    }

    #[test]
    fn test_wire_roundtrip() {
        let activation = sample_activation();
        let bytes = activation.to_bytes().unwrap();
        let decoded = Activation::from_bytes(&bytes).unwrap();

        assert_eq!(decoded.id, activation.id);
        assert_eq!(decoded.taskname, activation.taskname);
        assert_eq!(decoded.namespace, activation.namespace);
        assert_eq!(decoded.parameters, activation.parameters);
        assert_eq!(decoded.retry_state, activation.retry_state);
        assert_eq!(decoded.deadline_timestamp, activation.deadline_timestamp);
    }

    #[test]
    fn test_malformed_payload_rejected() {
        assert!(Activation::from_bytes(b"not an activation").is_err());
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();

        let mut activation = sample_activation();
        assert!(!activation.is_expired(now));

        activation.deadline_timestamp = Some(now.timestamp() - 10);
        assert!(activation.is_expired(now));

        activation.deadline_timestamp = None;
        assert!(!activation.is_expired(now));
    }

    #[test]
    fn test_next_attempt_keeps_identity() {
        let activation = sample_activation();
        let next = activation.next_attempt();

        assert_eq!(next.id, activation.id);
        assert_eq!(next.parameters, activation.parameters);
        assert_eq!(next.retry_state.attempts, 1);
    }
}

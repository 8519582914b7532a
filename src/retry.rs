use serde::{Deserialize, Serialize};

/// Retry policy for a task or namespace.
///
/// A policy bounds the number of delivery attempts and decides whether
/// exhausted work routes to the namespace deadletter topic or is dropped.
/// Constructed once at definition time and shared by many tasks; a task
/// or namespace without a policy makes a single attempt and stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    times: u32,
    deadletter: bool,
}

impl RetryPolicy {
    /// Create a policy allowing `times` attempts. Clamped to at least one
    /// attempt. Exhausted work is discarded unless deadletter routing is
    /// enabled with [`RetryPolicy::with_deadletter`].
    pub fn new(times: u32) -> Self {
        Self {
            times: times.max(1),
            deadletter: false,
        }
    }

    /// Route exhausted work to the namespace deadletter topic instead of
    /// dropping it
    pub fn with_deadletter(mut self, deadletter: bool) -> Self {
        self.deadletter = deadletter;
        self
    }

    /// Maximum number of attempts allowed by this policy
    pub fn times(&self) -> u32 {
        self.times
    }

    /// Whether exhausted work routes to deadletter
    pub fn deadletter_enabled(&self) -> bool {
        self.deadletter
    }

    /// Fresh state for a new execution lineage
    pub fn initial_state(&self) -> RetryState {
        if self.deadletter {
            RetryState {
                attempts: 0,
                discard_after_attempt: 0,
                deadletter_after_attempt: self.times,
            }
        } else {
            RetryState {
                attempts: 0,
                discard_after_attempt: self.times,
                deadletter_after_attempt: 0,
            }
        }
    }

    /// True while attempts remain. Flips to false exactly when
    /// `state.attempts` reaches the policy limit.
    pub fn should_retry(&self, state: &RetryState) -> bool {
        state.attempts < self.times
    }
}

/// Attempt-counter snapshot carried inside an [`Activation`].
///
/// Exactly one of `discard_after_attempt` / `deadletter_after_attempt` is
/// non-zero: no-retry lineages carry `discard_after_attempt = 1`, policies
/// without deadletter carry `discard_after_attempt = times`, and
/// deadletter policies carry `deadletter_after_attempt = times`. The
/// executing worker advances `attempts` after each failed attempt; the
/// enqueuing side never mutates it.
///
/// [`Activation`]: crate::types::Activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryState {
    /// Failed attempts made so far in this lineage
    pub attempts: u32,

    /// Attempt count after which the work item is dropped silently
    pub discard_after_attempt: u32,

    /// Attempt count after which the work item routes to deadletter
    pub deadletter_after_attempt: u32,
}

impl RetryState {
    /// State for work with no retry policy on the task or namespace: one
    /// attempt, then discard.
    pub fn single_attempt() -> Self {
        Self {
            attempts: 0,
            discard_after_attempt: 1,
            deadletter_after_attempt: 0,
        }
    }

    /// State for the next delivery attempt
    pub fn next_attempt(&self) -> Self {
        Self {
            attempts: self.attempts + 1,
            ..*self
        }
    }

    /// Whether this lineage routes to deadletter when exhausted
    pub fn deadletter_enabled(&self) -> bool {
        self.deadletter_after_attempt > 0
    }
}

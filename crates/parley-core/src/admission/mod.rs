//! Server-side synthesis admission control.
//!
//! Limits how many synthesis calls run against the backend at once. Jobs
//! beyond the limit wait in a FIFO list and are released one by one as
//! running jobs complete.
//!
//! # Design
//!
//! - [`AdmissionState`] is the pure state machine (counters + wait list)
//! - [`SynthesisQueue`] is the actor that owns it and runs backend calls
//! - Draining is event-driven: only a completion releases a waiting job

mod queue;
mod state;

use std::fmt;
use std::num::NonZeroUsize;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use queue::{PendingSynthesis, SynthesisQueue};
pub use state::{Admission, AdmissionState};

/// Default number of concurrent backend calls.
pub const DEFAULT_MAX_CONCURRENCY: NonZeroUsize = match NonZeroUsize::new(2) {
    Some(n) => n,
    None => unreachable!(),
};

/// Identifier assigned to each synthesis job on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Admission limits, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionConfig {
    /// Maximum number of jobs running against the backend at once.
    pub max_concurrency: NonZeroUsize,
    /// Maximum wait-list length. `None` means unbounded.
    pub max_waiting: Option<usize>,
    /// Per-job timeout for the backend call. `None` means no timeout.
    pub job_timeout: Option<Duration>,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            max_waiting: None,
            job_timeout: None,
        }
    }
}

impl AdmissionConfig {
    /// Create a config with the given concurrency limit and no other bounds.
    #[must_use]
    pub fn new(max_concurrency: NonZeroUsize) -> Self {
        Self {
            max_concurrency,
            ..Self::default()
        }
    }

    /// Bound the wait list; further submissions are rejected with
    /// [`SynthesisError::QueueFull`](crate::SynthesisError::QueueFull).
    #[must_use]
    pub const fn with_max_waiting(mut self, max_waiting: Option<usize>) -> Self {
        self.max_waiting = max_waiting;
        self
    }

    /// Fail a backend call that runs longer than `timeout`.
    #[must_use]
    pub const fn with_job_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.job_timeout = timeout;
        self
    }
}

/// Point-in-time view of the admission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionSnapshot {
    /// Configured concurrency limit.
    pub max_concurrency: usize,
    /// Jobs currently running against the backend.
    pub active_count: usize,
    /// Jobs waiting for a slot.
    pub waiting_count: usize,
    /// Configured wait-list bound, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_waiting: Option<usize>,
}

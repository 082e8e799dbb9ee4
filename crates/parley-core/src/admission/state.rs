//! Pure admission state machine.
//!
//! - Pure synchronous state machine (no async, no IO, no tracing)
//! - Commands return the job the caller must start, if any
//! - Deterministic: same inputs always produce same outputs
//!
//! The owner (the [`SynthesisQueue`](super::SynthesisQueue) actor) is
//! responsible for actually running dispatched jobs and for reporting their
//! completion back exactly once.

use std::collections::VecDeque;

use super::{AdmissionConfig, AdmissionSnapshot};

/// Outcome of offering a new job to the admission state.
#[derive(Debug, PartialEq, Eq)]
pub enum Admission<T> {
    /// Capacity was available; the job now holds a slot and must be started.
    Dispatch(T),
    /// No capacity; the job was appended to the wait list at this 1-based
    /// position.
    Queued { position: usize },
    /// The wait list is at its bound; the job is handed back untouched.
    Rejected { job: T, limit: usize },
}

/// Active-slot counter plus FIFO wait list.
///
/// Invariants:
/// - `active <= max_concurrency` at all times
/// - `waiting` is in arrival order and only its head is ever dispatched
/// - a dispatched job never re-enters `waiting`
#[derive(Debug)]
pub struct AdmissionState<T> {
    active: usize,
    waiting: VecDeque<T>,
    max_concurrency: usize,
    max_waiting: Option<usize>,
}

impl<T> AdmissionState<T> {
    /// Create an empty state for the given limits.
    pub fn new(config: &AdmissionConfig) -> Self {
        Self {
            active: 0,
            waiting: VecDeque::new(),
            max_concurrency: config.max_concurrency.get(),
            max_waiting: config.max_waiting,
        }
    }

    /// Number of jobs currently holding a slot.
    pub const fn active_count(&self) -> usize {
        self.active
    }

    /// Number of jobs in the wait list.
    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    /// Whether no job is active or waiting.
    pub fn is_idle(&self) -> bool {
        self.active == 0 && self.waiting.is_empty()
    }

    const fn has_capacity(&self) -> bool {
        self.active < self.max_concurrency
    }

    /// Offer a newly arrived job.
    pub fn admit(&mut self, job: T) -> Admission<T> {
        if self.has_capacity() {
            self.active += 1;
            return Admission::Dispatch(job);
        }

        if let Some(limit) = self.max_waiting {
            if self.waiting.len() >= limit {
                return Admission::Rejected { job, limit };
            }
        }

        self.waiting.push_back(job);
        Admission::Queued {
            position: self.waiting.len(),
        }
    }

    /// Release the slot held by a dispatched job that has finished
    /// (successfully or not).
    ///
    /// Must be called exactly once per dispatched job.
    pub fn complete(&mut self) {
        debug_assert!(self.active > 0, "complete() without a dispatched job");
        self.active = self.active.saturating_sub(1);
    }

    /// Move the head of the wait list into a free slot.
    ///
    /// Waiting jobs for which `is_live` returns `false` (their caller went
    /// away) are discarded on the way without taking a slot. Returns `None`
    /// when there is no capacity or no live waiting job.
    pub fn dispatch_next(&mut self, mut is_live: impl FnMut(&T) -> bool) -> Option<T> {
        while self.has_capacity() {
            let job = self.waiting.pop_front()?;
            if is_live(&job) {
                self.active += 1;
                return Some(job);
            }
        }
        None
    }

    /// Point-in-time view of the counters.
    pub fn snapshot(&self) -> AdmissionSnapshot {
        AdmissionSnapshot {
            max_concurrency: self.max_concurrency,
            active_count: self.active,
            waiting_count: self.waiting.len(),
            max_waiting: self.max_waiting,
        }
    }
}

//! Integration tests for the `SynthesisQueue` actor.
//!
//! A scripted backend sleeps for a per-text delay (on tokio's paused clock)
//! and records every call, so the tests can check dispatch order, peak
//! concurrency and timing without any network access.
//!
//! # What is tested
//!
//! - Two fast jobs and one waiter with mixed latencies
//! - Active count never exceeds the limit
//! - FIFO dispatch among waiting jobs
//! - Failed and timed-out jobs give their slot back
//! - Bounded wait list rejects with `QueueFull`
//! - Withdrawn waiters are skipped
//! - No deduplication of identical text

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use parley_core::{
    AdmissionConfig, SynthesisBackend, SynthesisError, SynthesisQueue, SynthesizedAudio,
};
use tokio::time::Instant;
use tokio_test::assert_pending;

// ── Scripted backend ───────────────────────────────────────────────

#[derive(Default)]
struct ScriptedBackend {
    delays: HashMap<String, Duration>,
    failing: Vec<String>,
    calls: Mutex<Vec<String>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedBackend {
    fn with_delays(delays: &[(&str, u64)]) -> Self {
        Self {
            delays: delays
                .iter()
                .map(|(text, ms)| ((*text).to_string(), Duration::from_millis(*ms)))
                .collect(),
            ..Self::default()
        }
    }

    fn failing_on(mut self, text: &str) -> Self {
        self.failing.push(text.to_string());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SynthesisBackend for ScriptedBackend {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, SynthesisError> {
        self.calls.lock().unwrap().push(text.to_string());
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .delays
            .get(text)
            .copied()
            .unwrap_or(Duration::from_millis(1));
        tokio::time::sleep(delay).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        if self.failing.iter().any(|t| t == text) {
            return Err(SynthesisError::backend("upstream returned 500"));
        }
        Ok(SynthesizedAudio::mpeg(format!("audio:{text}").into_bytes()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// ── Helpers ────────────────────────────────────────────────────────

fn limit(k: usize) -> AdmissionConfig {
    AdmissionConfig::new(NonZeroUsize::new(k).unwrap())
}

fn spawn_queue(backend: &Arc<ScriptedBackend>, config: AdmissionConfig) -> SynthesisQueue {
    SynthesisQueue::spawn(Arc::clone(backend) as Arc<dyn SynthesisBackend>, config)
}

/// Submit `text` and resolve to the result plus the time it took.
fn timed(
    queue: &SynthesisQueue,
    text: &str,
) -> tokio::task::JoinHandle<(Result<SynthesizedAudio, SynthesisError>, Duration)> {
    let started = Instant::now();
    let pending = queue.enqueue(text);
    tokio::spawn(async move {
        let result = pending.wait().await;
        (result, started.elapsed())
    })
}

fn assert_near(actual: Duration, expected_ms: u64) {
    let expected = Duration::from_millis(expected_ms);
    let tolerance = Duration::from_millis(5);
    assert!(
        actual >= expected && actual <= expected + tolerance,
        "expected ~{expected:?}, got {actual:?}"
    );
}

// ── Tests ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn mixed_latency_jobs_with_one_waiter() {
    let backend = Arc::new(ScriptedBackend::with_delays(&[("a", 100), ("b", 10), ("c", 10)]));
    let queue = spawn_queue(&backend, limit(2));

    let a = timed(&queue, "a");
    let b = timed(&queue, "b");
    let c = timed(&queue, "c");

    let snapshot = queue.snapshot().await.unwrap();
    assert_eq!(snapshot.active_count, 2);
    assert_eq!(snapshot.waiting_count, 1);

    let (b_result, b_elapsed) = b.await.unwrap();
    let (c_result, c_elapsed) = c.await.unwrap();
    let (a_result, a_elapsed) = a.await.unwrap();

    assert_eq!(&b_result.unwrap().bytes[..], b"audio:b");
    assert_eq!(&c_result.unwrap().bytes[..], b"audio:c");
    assert_eq!(&a_result.unwrap().bytes[..], b"audio:a");

    assert_near(b_elapsed, 10);
    // c only starts once b has released its slot.
    assert_near(c_elapsed, 20);
    assert_near(a_elapsed, 100);

    assert_eq!(backend.calls(), vec!["a", "b", "c"]);
    assert_eq!(backend.peak(), 2);

    let snapshot = queue.snapshot().await.unwrap();
    assert_eq!(snapshot.active_count, 0);
    assert_eq!(snapshot.waiting_count, 0);
}

#[tokio::test(start_paused = true)]
async fn active_count_never_exceeds_limit() {
    let backend = Arc::new(ScriptedBackend::with_delays(&[]));
    let queue = spawn_queue(&backend, limit(3));

    let jobs: Vec<_> = (0..12).map(|n| timed(&queue, &format!("job {n}"))).collect();
    for job in jobs {
        assert!(job.await.unwrap().0.is_ok());
    }

    assert_eq!(backend.calls().len(), 12);
    assert_eq!(backend.peak(), 3);
}

#[tokio::test(start_paused = true)]
async fn waiting_jobs_dispatch_in_arrival_order() {
    let backend = Arc::new(ScriptedBackend::with_delays(&[("first", 50)]));
    let queue = spawn_queue(&backend, limit(1));

    let jobs: Vec<_> = ["first", "w1", "w2", "w3"]
        .into_iter()
        .map(|text| queue.enqueue(text))
        .collect();
    for job in jobs {
        job.wait().await.unwrap();
    }

    assert_eq!(backend.calls(), vec!["first", "w1", "w2", "w3"]);
}

#[tokio::test(start_paused = true)]
async fn failed_job_releases_its_slot() {
    let backend = Arc::new(ScriptedBackend::with_delays(&[("broken", 5)]).failing_on("broken"));
    let queue = spawn_queue(&backend, limit(1));

    let broken = queue.enqueue("broken");
    let next = queue.enqueue("next");

    let err = broken.wait().await.unwrap_err();
    assert!(matches!(err, SynthesisError::BackendUnavailable(_)));
    assert!(next.wait().await.is_ok());

    let snapshot = queue.snapshot().await.unwrap();
    assert_eq!(snapshot.active_count, 0);
    assert_eq!(snapshot.waiting_count, 0);
}

#[tokio::test(start_paused = true)]
async fn timed_out_job_releases_its_slot() {
    let backend = Arc::new(ScriptedBackend::with_delays(&[("slow", 1_000), ("quick", 5)]));
    let timeout = Duration::from_millis(50);
    let queue = spawn_queue(&backend, limit(1).with_job_timeout(Some(timeout)));

    let slow = timed(&queue, "slow");
    let quick = timed(&queue, "quick");

    let (slow_result, slow_elapsed) = slow.await.unwrap();
    assert_eq!(slow_result.unwrap_err(), SynthesisError::Timeout(timeout));
    assert_near(slow_elapsed, 50);

    let (quick_result, quick_elapsed) = quick.await.unwrap();
    assert!(quick_result.is_ok());
    assert_near(quick_elapsed, 55);
}

#[tokio::test(start_paused = true)]
async fn full_wait_list_rejects_new_jobs() {
    let backend = Arc::new(ScriptedBackend::with_delays(&[("a", 100)]));
    let queue = spawn_queue(&backend, limit(1).with_max_waiting(Some(1)));

    let a = queue.enqueue("a");
    let b = queue.enqueue("b");
    let c = queue.enqueue("c");

    assert_eq!(
        c.wait().await.unwrap_err(),
        SynthesisError::QueueFull { limit: 1 }
    );

    let snapshot = queue.snapshot().await.unwrap();
    assert_eq!(snapshot.active_count, 1);
    assert_eq!(snapshot.waiting_count, 1);
    assert_eq!(snapshot.max_waiting, Some(1));

    assert!(a.wait().await.is_ok());
    assert!(b.wait().await.is_ok());
    assert_eq!(backend.calls(), vec!["a", "b"]);
}

#[tokio::test(start_paused = true)]
async fn withdrawn_waiter_is_skipped() {
    let backend = Arc::new(ScriptedBackend::with_delays(&[("a", 50)]));
    let queue = spawn_queue(&backend, limit(1));

    let a = queue.enqueue("a");
    let mut gone = tokio_test::task::spawn(queue.enqueue("gone").wait());
    let c = queue.enqueue("c");

    assert_pending!(gone.poll());
    drop(gone);

    assert!(a.wait().await.is_ok());
    assert!(c.wait().await.is_ok());
    assert_eq!(backend.calls(), vec!["a", "c"]);
}

#[tokio::test(start_paused = true)]
async fn identical_text_is_synthesized_twice() {
    let backend = Arc::new(ScriptedBackend::with_delays(&[]));
    let queue = spawn_queue(&backend, limit(2));

    let (first, second) = tokio::join!(queue.submit("same"), queue.submit("same"));

    assert_eq!(first.unwrap(), second.unwrap());
    assert_eq!(backend.calls(), vec!["same", "same"]);
}

#[tokio::test(start_paused = true)]
async fn accepted_jobs_finish_after_handles_are_dropped() {
    let backend = Arc::new(ScriptedBackend::with_delays(&[("a", 20), ("b", 20)]));
    let queue = spawn_queue(&backend, limit(1));

    let a = queue.enqueue("a");
    let b = queue.enqueue("b");
    drop(queue);

    assert!(a.wait().await.is_ok());
    assert!(b.wait().await.is_ok());
}

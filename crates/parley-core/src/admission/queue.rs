//! Admission queue actor.
//!
//! A single task owns the [`AdmissionState`] and processes messages one at a
//! time:
//!
//! - `Submit` from callers (through [`SynthesisQueue`] handles)
//! - `Snapshot` queries
//! - completions reported by the per-job tasks it spawned
//!
//! Because only this task touches the state, every transition (admit,
//! complete + deliver + dispatch next) runs to completion without locks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::audio::SynthesizedAudio;
use crate::error::SynthesisError;
use crate::ports::{SynthesisBackend, SynthesisTransport};

use super::state::{Admission, AdmissionState};
use super::{AdmissionConfig, AdmissionSnapshot, JobId};

type JobResult = Result<SynthesizedAudio, SynthesisError>;

/// One synthesis request, owned by the queue until its result is delivered.
struct SynthesisJob {
    id: JobId,
    text: String,
    reply: oneshot::Sender<JobResult>,
}

impl SynthesisJob {
    /// Whether the caller is still waiting for the result.
    fn is_live(&self) -> bool {
        !self.reply.is_closed()
    }
}

enum QueueCommand {
    Submit(SynthesisJob),
    Snapshot {
        reply: oneshot::Sender<AdmissionSnapshot>,
    },
}

/// Reported by a job task when its backend call has finished.
struct Completion {
    job: SynthesisJob,
    outcome: JobResult,
    elapsed: Duration,
}

/// Handle to the admission queue actor.
///
/// Cheap to clone; all clones feed the same actor. The actor keeps running
/// until every handle is dropped and all accepted jobs have completed.
#[derive(Clone)]
pub struct SynthesisQueue {
    commands: mpsc::UnboundedSender<QueueCommand>,
    next_id: Arc<AtomicU64>,
}

/// A submitted job whose result has not been collected yet.
///
/// Dropping it before the job is dispatched withdraws the job: the queue
/// skips it instead of calling the backend.
pub struct PendingSynthesis {
    id: JobId,
    rx: oneshot::Receiver<JobResult>,
}

impl PendingSynthesis {
    /// Identifier assigned to the job on arrival.
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Wait for the job's audio (or failure).
    pub async fn wait(self) -> JobResult {
        self.rx.await.unwrap_or(Err(SynthesisError::QueueClosed))
    }
}

impl SynthesisQueue {
    /// Spawn the actor on the current tokio runtime.
    pub fn spawn(backend: Arc<dyn SynthesisBackend>, config: AdmissionConfig) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let actor = QueueActor::new(backend, &config, rx);
        tokio::spawn(actor.run());

        Self {
            commands,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Hand `text` to the queue without waiting for the result.
    ///
    /// Jobs are admitted in the order `enqueue` is called.
    pub fn enqueue(&self, text: impl Into<String>) -> PendingSynthesis {
        let id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (reply, rx) = oneshot::channel();
        let job = SynthesisJob {
            id,
            text: text.into(),
            reply,
        };

        // On send failure the job (and its reply sender) is dropped, so
        // `wait` reports `QueueClosed`.
        let _ = self.commands.send(QueueCommand::Submit(job));
        PendingSynthesis { id, rx }
    }

    /// Submit `text` and wait for its audio.
    pub async fn submit(&self, text: impl Into<String>) -> JobResult {
        self.enqueue(text).wait().await
    }

    /// Current admission counters.
    pub async fn snapshot(&self) -> Result<AdmissionSnapshot, SynthesisError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(QueueCommand::Snapshot { reply })
            .map_err(|_| SynthesisError::QueueClosed)?;
        rx.await.map_err(|_| SynthesisError::QueueClosed)
    }
}

#[async_trait]
impl SynthesisTransport for SynthesisQueue {
    async fn synthesize(&self, text: &str) -> JobResult {
        self.submit(text).await
    }
}

struct QueueActor {
    backend: Arc<dyn SynthesisBackend>,
    job_timeout: Option<Duration>,
    state: AdmissionState<SynthesisJob>,
    commands: mpsc::UnboundedReceiver<QueueCommand>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl QueueActor {
    fn new(
        backend: Arc<dyn SynthesisBackend>,
        config: &AdmissionConfig,
        commands: mpsc::UnboundedReceiver<QueueCommand>,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            job_timeout: config.job_timeout,
            state: AdmissionState::new(config),
            commands,
            completions_tx,
            completions_rx,
        }
    }

    async fn run(mut self) {
        let snapshot = self.state.snapshot();
        info!(
            target: "parley.admission",
            backend = self.backend.name(),
            max_concurrency = snapshot.max_concurrency,
            max_waiting = ?snapshot.max_waiting,
            job_timeout = ?self.job_timeout,
            "Synthesis queue started"
        );

        let mut accepting = true;
        loop {
            tokio::select! {
                cmd = self.commands.recv(), if accepting => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => accepting = false,
                },
                Some(done) = self.completions_rx.recv() => self.handle_completion(done),
            }

            // All handles are gone: finish what was accepted, then stop.
            if !accepting && self.state.is_idle() {
                break;
            }
        }

        debug!(target: "parley.admission", "Synthesis queue stopped");
    }

    fn handle_command(&mut self, cmd: QueueCommand) {
        match cmd {
            QueueCommand::Submit(job) => self.admit(job),
            QueueCommand::Snapshot { reply } => {
                let _ = reply.send(self.state.snapshot());
            }
        }
    }

    fn admit(&mut self, job: SynthesisJob) {
        let id = job.id;
        match self.state.admit(job) {
            Admission::Dispatch(job) => {
                debug!(
                    target: "parley.admission",
                    job_id = %id,
                    active = self.state.active_count(),
                    "Job admitted"
                );
                self.start(job);
            }
            Admission::Queued { position } => {
                debug!(
                    target: "parley.admission",
                    job_id = %id,
                    position,
                    active = self.state.active_count(),
                    "Job waiting for a slot"
                );
            }
            Admission::Rejected { job, limit } => {
                warn!(
                    target: "parley.admission",
                    job_id = %id,
                    limit,
                    "Wait list full, rejecting job"
                );
                let _ = job.reply.send(Err(SynthesisError::QueueFull { limit }));
            }
        }
    }

    /// Run the backend call for a job that already holds a slot.
    fn start(&self, job: SynthesisJob) {
        let backend = Arc::clone(&self.backend);
        let timeout = self.job_timeout;
        let done = self.completions_tx.clone();

        tokio::spawn(async move {
            let started = Instant::now();
            let text = job.text.clone();

            // The call runs in its own task so that a panicking backend still
            // produces a completion and the slot is reclaimed.
            let call = tokio::spawn(async move { call_backend(backend.as_ref(), &text, timeout).await });
            let outcome = call.await.unwrap_or_else(|e| {
                Err(SynthesisError::backend(format!("synthesis task failed: {e}")))
            });

            let _ = done.send(Completion {
                job,
                outcome,
                elapsed: started.elapsed(),
            });
        });
    }

    fn handle_completion(&mut self, done: Completion) {
        let Completion {
            job,
            outcome,
            elapsed,
        } = done;

        self.state.complete();

        match &outcome {
            Ok(audio) => debug!(
                target: "parley.admission",
                job_id = %job.id,
                bytes = audio.len(),
                elapsed_ms = elapsed.as_millis(),
                active = self.state.active_count(),
                "Job completed"
            ),
            Err(e) => warn!(
                target: "parley.admission",
                job_id = %job.id,
                elapsed_ms = elapsed.as_millis(),
                error = %e,
                "Job failed"
            ),
        }

        if job.reply.send(outcome).is_err() {
            debug!(target: "parley.admission", job_id = %job.id, "Caller went away before result");
        }

        self.dispatch_waiting();
    }

    fn dispatch_waiting(&mut self) {
        let next = self.state.dispatch_next(|job| {
            let live = job.is_live();
            if !live {
                debug!(target: "parley.admission", job_id = %job.id, "Skipping withdrawn job");
            }
            live
        });

        if let Some(job) = next {
            debug!(
                target: "parley.admission",
                job_id = %job.id,
                waiting = self.state.waiting_count(),
                "Job dispatched from wait list"
            );
            self.start(job);
        }
    }
}

async fn call_backend(
    backend: &dyn SynthesisBackend,
    text: &str,
    timeout: Option<Duration>,
) -> JobResult {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, backend.synthesize(text))
            .await
            .unwrap_or(Err(SynthesisError::Timeout(limit))),
        None => backend.synthesize(text).await,
    }
}

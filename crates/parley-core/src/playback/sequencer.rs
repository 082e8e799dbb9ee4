//! Playback sequencer actor.
//!
//! Owns a [`PlaybackQueue`] and drives it with a synthesis transport and an
//! audio sink. Transport and sink calls run in spawned tasks and report back
//! over an internal channel, so the actor stays responsive to new
//! utterances while a clip is synthesizing or playing.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::audio::SynthesizedAudio;
use crate::error::{PlaybackError, SynthesisError};
use crate::ports::{AudioSink, SynthesisTransport};

use super::state::{PlaybackQueue, PlaybackState, PlaybackStep};

/// Sequencer limits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequencerConfig {
    /// Maximum utterances waiting for synthesis. `None` means unbounded.
    pub max_pending: Option<usize>,
}

impl SequencerConfig {
    #[must_use]
    pub const fn with_max_pending(mut self, max_pending: Option<usize>) -> Self {
        self.max_pending = max_pending;
        self
    }
}

/// Progress notifications emitted by the sequencer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    StateChanged(PlaybackState),
    Enqueued { sequence: u64 },
    /// An utterance was turned away because the pending list is full.
    Rejected { limit: usize },
    Started { sequence: u64 },
    Finished { sequence: u64 },
    Skipped { sequence: u64, reason: String },
    /// Everything accepted so far has been played or skipped.
    Drained,
}

enum Command {
    Enqueue {
        text: String,
        reply: oneshot::Sender<Result<u64, PlaybackError>>,
    },
    Close,
}

enum WorkDone {
    Synthesized {
        sequence: u64,
        result: Result<SynthesizedAudio, SynthesisError>,
    },
    Played {
        sequence: u64,
        result: Result<(), PlaybackError>,
    },
}

/// Entry point for starting a sequencer.
pub struct PlaybackSequencer;

impl PlaybackSequencer {
    /// Spawn a sequencer on the current tokio runtime.
    ///
    /// Returns the control handle and the event stream. Dropping the event
    /// receiver is allowed; events are then discarded.
    pub fn spawn(
        transport: Arc<dyn SynthesisTransport>,
        sink: Arc<dyn AudioSink>,
        config: SequencerConfig,
    ) -> (PlaybackHandle, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (commands, commands_rx) = mpsc::unbounded_channel();
        let (events, events_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = mpsc::unbounded_channel();

        let actor = SequencerActor {
            queue: PlaybackQueue::new(config.max_pending),
            reported_state: PlaybackState::Idle,
            transport,
            sink,
            events,
            commands: commands_rx,
            done_tx,
            done_rx,
        };
        let task = tokio::spawn(actor.run());

        (PlaybackHandle { commands, task }, events_rx)
    }
}

/// Control handle for a running sequencer.
///
/// Dropping the handle has the same effect as [`close`](Self::close).
pub struct PlaybackHandle {
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl PlaybackHandle {
    /// Add an utterance to the end of the stream, returning its sequence
    /// number.
    pub async fn enqueue(&self, text: impl Into<String>) -> Result<u64, PlaybackError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Enqueue {
                text: text.into(),
                reply,
            })
            .map_err(|_| PlaybackError::Closed)?;
        rx.await.map_err(|_| PlaybackError::Closed)?
    }

    /// Stop accepting utterances. Already accepted ones are still played.
    pub fn close(&self) {
        let _ = self.commands.send(Command::Close);
    }

    /// Close the sequencer and wait until it has drained.
    pub async fn join(self) -> Result<(), PlaybackError> {
        self.close();
        let Self { commands, task } = self;
        drop(commands);
        task.await.map_err(|e| {
            warn!(target: "parley.playback", error = %e, "Sequencer task failed");
            PlaybackError::Closed
        })
    }
}

struct SequencerActor {
    queue: PlaybackQueue<SynthesizedAudio>,
    reported_state: PlaybackState,
    transport: Arc<dyn SynthesisTransport>,
    sink: Arc<dyn AudioSink>,
    events: mpsc::UnboundedSender<PlaybackEvent>,
    commands: mpsc::UnboundedReceiver<Command>,
    done_tx: mpsc::UnboundedSender<WorkDone>,
    done_rx: mpsc::UnboundedReceiver<WorkDone>,
}

impl SequencerActor {
    async fn run(mut self) {
        debug!(target: "parley.playback", "Sequencer started");

        let mut accepting = true;
        loop {
            tokio::select! {
                cmd = self.commands.recv(), if accepting => match cmd {
                    Some(Command::Enqueue { text, reply }) => {
                        let _ = reply.send(self.enqueue(text));
                    }
                    Some(Command::Close) | None => accepting = false,
                },
                Some(done) = self.done_rx.recv() => self.handle_done(done),
            }

            if !accepting && self.queue.is_drained() {
                break;
            }
        }

        debug!(target: "parley.playback", "Sequencer stopped");
    }

    fn enqueue(&mut self, text: String) -> Result<u64, PlaybackError> {
        match self.queue.push(text) {
            Ok(sequence) => {
                debug!(target: "parley.playback", sequence, "Utterance enqueued");
                self.emit(PlaybackEvent::Enqueued { sequence });
                let step = self.queue.advance();
                self.run_step(step);
                Ok(sequence)
            }
            Err(limit) => {
                warn!(target: "parley.playback", limit, "Pending list full, rejecting utterance");
                self.emit(PlaybackEvent::Rejected { limit });
                Err(PlaybackError::QueueFull { limit })
            }
        }
    }

    fn handle_done(&mut self, done: WorkDone) {
        let step = match done {
            WorkDone::Synthesized {
                sequence,
                result: Ok(audio),
            } => {
                debug!(target: "parley.playback", sequence, bytes = audio.len(), "Audio ready");
                self.queue.synthesized(sequence, audio)
            }
            WorkDone::Synthesized {
                sequence,
                result: Err(e),
            } => {
                warn!(target: "parley.playback", sequence, error = %e, "Synthesis failed, skipping utterance");
                self.emit(PlaybackEvent::Skipped {
                    sequence,
                    reason: e.to_string(),
                });
                self.queue.synthesis_failed(sequence)
            }
            WorkDone::Played {
                sequence,
                result: Ok(()),
            } => {
                info!(target: "parley.playback", sequence, "Utterance played");
                self.emit(PlaybackEvent::Finished { sequence });
                self.queue.finished(sequence)
            }
            WorkDone::Played {
                sequence,
                result: Err(e),
            } => {
                warn!(target: "parley.playback", sequence, error = %e, "Playback failed, skipping utterance");
                self.emit(PlaybackEvent::Skipped {
                    sequence,
                    reason: e.to_string(),
                });
                self.queue.finished(sequence)
            }
        };

        self.run_step(step);

        if self.queue.is_drained() {
            self.emit(PlaybackEvent::Drained);
        }
    }

    fn run_step(&mut self, step: Option<PlaybackStep<SynthesizedAudio>>) {
        self.report_state();

        match step {
            Some(PlaybackStep::Synthesize(utterance)) => {
                let transport = Arc::clone(&self.transport);
                let done = self.done_tx.clone();
                tokio::spawn(async move {
                    let result = transport.synthesize(&utterance.text).await;
                    let _ = done.send(WorkDone::Synthesized {
                        sequence: utterance.sequence,
                        result,
                    });
                });
            }
            Some(PlaybackStep::Play { sequence, audio }) => {
                self.emit(PlaybackEvent::Started { sequence });
                let sink = Arc::clone(&self.sink);
                let done = self.done_tx.clone();
                tokio::spawn(async move {
                    let result = sink.play(audio).await;
                    let _ = done.send(WorkDone::Played { sequence, result });
                });
            }
            None => {}
        }
    }

    fn report_state(&mut self) {
        let state = self.queue.state();
        if state != self.reported_state {
            self.reported_state = state;
            self.emit(PlaybackEvent::StateChanged(state));
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        let _ = self.events.send(event);
    }
}

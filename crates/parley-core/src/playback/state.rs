//! Pure playback ordering state machine.
//!
//! - Pure synchronous state machine (no async, no IO, no tracing)
//! - Every transition returns the next [`PlaybackStep`] the owner must run
//! - Generic over the audio type so it can be exercised without real clips
//!
//! Only one utterance is ever active: the machine hands out a new step only
//! after the previous one has been reported back.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

/// Sequencer state, `Idle → Synthesizing → Playing → Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Idle,
    Synthesizing,
    Playing,
}

/// One piece of text awaiting speech, tagged with its arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    /// 1-based position in the session's utterance stream.
    pub sequence: u64,
    pub text: String,
}

/// Work the owner must perform next.
#[derive(Debug, PartialEq, Eq)]
pub enum PlaybackStep<A> {
    /// Request audio for this utterance.
    Synthesize(Utterance),
    /// Play this clip to completion.
    Play { sequence: u64, audio: A },
}

/// Ordered playback queue for one session.
///
/// Invariants:
/// - `ready` is consumed strictly in ascending sequence order
/// - at most one utterance is synthesizing or playing at any instant
/// - sequence numbers are assigned contiguously to accepted utterances
#[derive(Debug)]
pub struct PlaybackQueue<A> {
    pending: VecDeque<Utterance>,
    ready: BTreeMap<u64, A>,
    state: PlaybackState,
    next_to_play: u64,
    next_sequence: u64,
    max_pending: Option<usize>,
}

impl<A> Default for PlaybackQueue<A> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<A> PlaybackQueue<A> {
    /// Create an empty queue. `max_pending` bounds the number of utterances
    /// waiting for synthesis; `None` means unbounded.
    pub const fn new(max_pending: Option<usize>) -> Self {
        Self {
            pending: VecDeque::new(),
            ready: BTreeMap::new(),
            state: PlaybackState::Idle,
            next_to_play: 1,
            next_sequence: 1,
            max_pending,
        }
    }

    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    /// Utterances waiting for synthesis.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is active, pending or buffered.
    pub fn is_drained(&self) -> bool {
        self.state == PlaybackState::Idle && self.pending.is_empty() && self.ready.is_empty()
    }

    /// Accept a new utterance and assign its sequence number.
    ///
    /// Returns `Err(limit)` without assigning a number when the pending list
    /// is at its bound. An utterance that can start right away never waits,
    /// so the bound does not apply to it.
    pub fn push(&mut self, text: impl Into<String>) -> Result<u64, usize> {
        let starts_now = self.state == PlaybackState::Idle && self.pending.is_empty();
        if let Some(limit) = self.max_pending {
            if !starts_now && self.pending.len() >= limit {
                return Err(limit);
            }
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.pending.push_back(Utterance {
            sequence,
            text: text.into(),
        });
        Ok(sequence)
    }

    /// Start the next piece of work if the queue is idle.
    ///
    /// Buffered audio for the next expected sequence number is played
    /// before any further synthesis is requested.
    pub fn advance(&mut self) -> Option<PlaybackStep<A>> {
        if self.state != PlaybackState::Idle {
            return None;
        }

        if let Some(audio) = self.ready.remove(&self.next_to_play) {
            self.state = PlaybackState::Playing;
            return Some(PlaybackStep::Play {
                sequence: self.next_to_play,
                audio,
            });
        }

        let utterance = self.pending.pop_front()?;
        self.state = PlaybackState::Synthesizing;
        Some(PlaybackStep::Synthesize(utterance))
    }

    /// Record audio for `sequence` and move on.
    pub fn synthesized(&mut self, sequence: u64, audio: A) -> Option<PlaybackStep<A>> {
        debug_assert_eq!(self.state, PlaybackState::Synthesizing);
        self.ready.insert(sequence, audio);
        self.state = PlaybackState::Idle;
        self.advance()
    }

    /// Skip `sequence` after its synthesis failed.
    pub fn synthesis_failed(&mut self, sequence: u64) -> Option<PlaybackStep<A>> {
        debug_assert_eq!(self.state, PlaybackState::Synthesizing);
        self.skip_past(sequence);
        self.advance()
    }

    /// Playback of `sequence` ended (played through or failed).
    pub fn finished(&mut self, sequence: u64) -> Option<PlaybackStep<A>> {
        debug_assert_eq!(self.state, PlaybackState::Playing);
        self.skip_past(sequence);
        self.advance()
    }

    fn skip_past(&mut self, sequence: u64) {
        self.state = PlaybackState::Idle;
        if sequence >= self.next_to_play {
            self.next_to_play = sequence + 1;
        }
    }
}

//! Client-side ordered playback.
//!
//! Turns a stream of text utterances into strictly sequential, in-order
//! speech. One utterance is active at a time: it is synthesized, played to
//! completion, and only then does the next one start. Failures skip the
//! utterance instead of stalling the stream.

mod sequencer;
mod state;

pub use sequencer::{PlaybackEvent, PlaybackHandle, PlaybackSequencer, SequencerConfig};
pub use state::{PlaybackQueue, PlaybackState, PlaybackStep, Utterance};

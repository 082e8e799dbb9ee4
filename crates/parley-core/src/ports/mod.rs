//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core pipeline expects from
//! infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No `reqwest`, `axum` or `rodio` types in any signature
//! - Every port is `Send + Sync` so actors can hold it behind an `Arc`
//! - Async methods suspend until the operation has fully completed

pub mod audio_sink;
pub mod synthesis;
pub mod transcription;

pub use audio_sink::AudioSink;
pub use synthesis::{SynthesisBackend, SynthesisTransport};
pub use transcription::{Transcription, TranscriptionBackend};

#[cfg(test)]
pub use audio_sink::MockAudioSink;
#[cfg(test)]
pub use synthesis::{MockSynthesisBackend, MockSynthesisTransport};

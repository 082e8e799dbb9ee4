#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod admission;
pub mod audio;
pub mod error;
pub mod playback;
pub mod ports;

// Re-export commonly used types for convenience
pub use admission::{
    AdmissionConfig, AdmissionSnapshot, AdmissionState, JobId, PendingSynthesis, SynthesisQueue,
};
pub use audio::{AUDIO_MPEG, SynthesizedAudio};
pub use error::{PlaybackError, SynthesisError, TranscriptionError};
pub use playback::{
    PlaybackEvent, PlaybackHandle, PlaybackQueue, PlaybackSequencer, PlaybackState, PlaybackStep,
    SequencerConfig, Utterance,
};
pub use ports::{AudioSink, SynthesisBackend, SynthesisTransport, Transcription, TranscriptionBackend};

// Silence unused dev-dependency warnings for integration-only helpers
#[cfg(test)]
use tokio_test as _;

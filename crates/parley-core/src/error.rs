//! Error types for the synthesis and playback pipeline.
//!
//! Adapters map these onto their own surfaces: `parley-axum` turns them into
//! HTTP status codes, `parley-cli` into exit codes and log lines.

use std::time::Duration;

use thiserror::Error;

/// Errors produced while synthesizing a single piece of text.
///
/// A `SynthesisError` always belongs to exactly one job. It is reported to
/// that job's caller and never affects the admission state of other jobs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SynthesisError {
    /// The synthesis backend could not be reached or answered with a
    /// non-success status.
    #[error("Synthesis backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend did not answer within the configured per-job timeout.
    #[error("Synthesis timed out after {0:?}")]
    Timeout(Duration),

    /// The wait list is at its configured bound; the job was not queued.
    #[error("Synthesis queue is full ({limit} jobs waiting)")]
    QueueFull { limit: usize },

    /// The request carried no usable text payload.
    #[error("Malformed synthesis request: {0}")]
    MalformedRequest(String),

    /// The admission queue has shut down.
    #[error("Synthesis queue is closed")]
    QueueClosed,
}

impl SynthesisError {
    /// Build a `BackendUnavailable` from any displayable error.
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::BackendUnavailable(err.to_string())
    }

    /// Whether this failure came from the backend side (transport error,
    /// bad status or timeout) rather than from queue admission.
    pub const fn is_backend_failure(&self) -> bool {
        matches!(self, Self::BackendUnavailable(_) | Self::Timeout(_))
    }
}

/// Errors produced by the client-side playback sequencer and audio sinks.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Synthesis of the utterance failed.
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// The audio output device could not be opened or failed mid-clip.
    #[error("Audio output device error: {0}")]
    Device(String),

    /// The synthesized audio could not be decoded.
    #[error("Failed to decode audio: {0}")]
    Decode(String),

    /// The pending-utterance list is at its configured bound.
    #[error("Playback queue is full ({limit} utterances pending)")]
    QueueFull { limit: usize },

    /// The sequencer has shut down.
    #[error("Playback sequencer is closed")]
    Closed,

    /// IO error (file sinks).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced by the speech-to-text relay.
#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// No transcription backend credentials were configured.
    #[error("Transcription backend is not configured")]
    NotConfigured,

    /// The uploaded audio body was empty.
    #[error("No audio data received")]
    EmptyAudio,

    /// The transcription backend failed or returned a non-success status.
    #[error("Transcription backend unavailable: {0}")]
    BackendUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_failures_are_classified() {
        assert!(SynthesisError::backend("connection refused").is_backend_failure());
        assert!(SynthesisError::Timeout(Duration::from_secs(5)).is_backend_failure());
        assert!(!SynthesisError::QueueFull { limit: 4 }.is_backend_failure());
        assert!(!SynthesisError::QueueClosed.is_backend_failure());
    }

    #[test]
    fn queue_full_message_names_the_limit() {
        let msg = SynthesisError::QueueFull { limit: 8 }.to_string();
        assert!(msg.contains('8'), "got: {msg}");
    }

    #[test]
    fn playback_error_wraps_synthesis_error() {
        let err: PlaybackError = SynthesisError::backend("503").into();
        assert!(matches!(
            err,
            PlaybackError::Synthesis(SynthesisError::BackendUnavailable(_))
        ));
        assert_eq!(err.to_string(), "Synthesis backend unavailable: 503");
    }
}

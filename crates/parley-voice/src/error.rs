//! Adapter construction errors.
//!
//! Runtime failures are reported through the core error types
//! ([`SynthesisError`](parley_core::SynthesisError),
//! [`TranscriptionError`](parley_core::TranscriptionError),
//! [`PlaybackError`](parley_core::PlaybackError)); this type only covers
//! building an adapter.

/// Errors that can occur while setting up a voice adapter.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// A required setting (API key, voice id, ...) was empty.
    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),

    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The audio output device could not be opened.
    #[error("Failed to open audio output: {0}")]
    OutputDevice(String),

    /// The dedicated audio thread exited unexpectedly.
    #[error("Audio thread died unexpectedly")]
    AudioThreadDied,
}

/// Reject empty or whitespace-only settings.
pub(crate) fn require(value: &str, name: &'static str) -> Result<(), VoiceError> {
    if value.trim().is_empty() {
        Err(VoiceError::MissingSetting(name))
    } else {
        Ok(())
    }
}

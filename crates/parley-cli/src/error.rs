//! CLI-specific error types and mappings.

use parley_core::PlaybackError;
use parley_voice::VoiceError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid or incomplete configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (input file, output directory).
    #[error("IO error: {0}")]
    Io(String),

    /// Audio output or sequencer failure.
    #[error("Playback error: {0}")]
    Playback(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow sysexits.h where one fits.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 78, // EX_CONFIG
            Self::Io(_) => 74,     // EX_IOERR
            Self::Playback(_) => 1,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<VoiceError> for CliError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::MissingSetting(_) | VoiceError::HttpClient(_) => {
                Self::Config(err.to_string())
            }
            VoiceError::OutputDevice(_) | VoiceError::AudioThreadDied => {
                Self::Playback(err.to_string())
            }
        }
    }
}

impl From<PlaybackError> for CliError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::Io(e) => Self::Io(e.to_string()),
            other => Self::Playback(other.to_string()),
        }
    }
}

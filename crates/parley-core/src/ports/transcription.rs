//! Speech-to-text port used by the upload relay.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::TranscriptionError;

/// Result of transcribing one recording.
#[derive(Debug, Clone)]
pub struct Transcription {
    /// Recognised text (empty when nothing was recognised).
    pub text: String,
    /// Upstream response body, relayed verbatim to HTTP clients.
    pub raw: serde_json::Value,
}

/// External speech-to-text service.
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    /// Transcribe one encoded recording.
    async fn transcribe(&self, audio: Bytes) -> Result<Transcription, TranscriptionError>;
}

//! Speech synthesis ports.
//!
//! Two traits share the same shape but sit on different sides of the network:
//!
//! - [`SynthesisBackend`] is the scarce external service the server-side
//!   admission queue protects (e.g. the ElevenLabs API).
//! - [`SynthesisTransport`] is what the client-side sequencer calls to get
//!   audio for an utterance (e.g. `POST /tts` on a parley server, or an
//!   in-process [`SynthesisQueue`](crate::admission::SynthesisQueue)).

use async_trait::async_trait;

use crate::audio::SynthesizedAudio;
use crate::error::SynthesisError;

/// External text-to-speech service.
///
/// Implementations perform exactly one outbound call per invocation; retries,
/// deduplication and concurrency limits are not their concern.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    /// Convert `text` into one complete audio clip.
    ///
    /// Empty or whitespace-only text is forwarded as-is; the backend's own
    /// validation decides whether it is rejected.
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, SynthesisError>;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}

/// Client-side route to a synthesis service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SynthesisTransport: Send + Sync {
    /// Request audio for `text`, suspending until it arrives or fails.
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, SynthesisError>;
}

//! Audio output port.

use async_trait::async_trait;

use crate::audio::SynthesizedAudio;
use crate::error::PlaybackError;

/// An audio output with a single "currently playing" slot.
///
/// [`play`](AudioSink::play) resolves when the clip has finished playing,
/// which is the end-of-playback notification the sequencer waits on. The
/// sequencer never calls `play` while a previous call is still pending.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Play one clip to completion.
    async fn play(&self, audio: SynthesizedAudio) -> Result<(), PlaybackError>;
}

//! Synthesized audio artifact.

use bytes::Bytes;

/// MIME type of the audio produced by the default synthesis backend.
pub const AUDIO_MPEG: &str = "audio/mpeg";

/// One complete audio clip produced for one piece of text.
///
/// The payload is reference-counted ([`Bytes`]) so handing it from the
/// backend to the HTTP response or to an audio sink never copies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    /// Encoded audio bytes.
    pub bytes: Bytes,
    /// MIME type of `bytes` (e.g. `audio/mpeg`).
    pub content_type: String,
}

impl SynthesizedAudio {
    /// Wrap encoded audio with an explicit content type.
    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    /// Wrap MP3 audio.
    pub fn mpeg(bytes: impl Into<Bytes>) -> Self {
        Self::new(bytes, AUDIO_MPEG)
    }

    /// Size of the encoded payload in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

//! Audio sinks that do not need a sound device.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parley_core::{AudioSink, PlaybackError, SynthesizedAudio};
use tracing::{debug, info};

/// Discards audio. Playback "finishes" as soon as it starts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait]
impl AudioSink for NullSink {
    async fn play(&self, audio: SynthesizedAudio) -> Result<(), PlaybackError> {
        debug!(target: "parley.voice", bytes = audio.len(), "Discarding clip");
        Ok(())
    }
}

/// Writes each clip to `<dir>/NNNN.<ext>` in playback order.
#[derive(Debug)]
pub struct FileSink {
    dir: PathBuf,
    counter: AtomicU64,
}

impl FileSink {
    /// Create the sink, creating `dir` if needed.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self, PlaybackError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            counter: AtomicU64::new(1),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/ogg" => "ogg",
        _ => "bin",
    }
}

#[async_trait]
impl AudioSink for FileSink {
    async fn play(&self, audio: SynthesizedAudio) -> Result<(), PlaybackError> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let path = self
            .dir
            .join(format!("{n:04}.{}", extension_for(&audio.content_type)));

        tokio::fs::write(&path, &audio.bytes).await?;
        info!(target: "parley.voice", path = %path.display(), bytes = audio.len(), "Clip written");
        Ok(())
    }
}

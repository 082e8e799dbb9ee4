//! Speaker output on a dedicated audio thread.
//!
//! `rodio::OutputStream` is `!Send` on some platforms, so it never leaves
//! the thread that created it. [`DeviceSink`] is the `Send + Sync` proxy:
//! every clip is sent to the thread as a command and the caller awaits a
//! oneshot reply that fires once the clip has finished playing.

use std::io::Cursor;
use std::sync::mpsc;
use std::thread;

use async_trait::async_trait;
use parley_core::{AudioSink, PlaybackError, SynthesizedAudio};
use rodio::{Decoder, OutputStream, Sink};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::error::VoiceError;

// ── Commands ───────────────────────────────────────────────────────

enum AudioCommand {
    /// Decode and play one clip, replying when the sink drains.
    Play {
        audio: SynthesizedAudio,
        reply: oneshot::Sender<Result<(), PlaybackError>>,
    },
    Shutdown,
}

// ── Handle ─────────────────────────────────────────────────────────

/// [`AudioSink`] that plays through the default output device.
pub struct DeviceSink {
    cmd_tx: mpsc::Sender<AudioCommand>,
    thread: Option<thread::JoinHandle<()>>,
}

impl DeviceSink {
    /// Spawn the audio thread and open the default output device.
    pub fn open() -> Result<Self, VoiceError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<AudioCommand>();
        let (init_tx, init_rx) = mpsc::channel::<Result<(), VoiceError>>();

        let thread = thread::Builder::new()
            .name("parley-audio".into())
            .spawn(move || Self::run(&cmd_rx, &init_tx))
            .map_err(|e| VoiceError::OutputDevice(format!("failed to spawn audio thread: {e}")))?;

        init_rx.recv().map_err(|_| VoiceError::AudioThreadDied)??;

        Ok(Self {
            cmd_tx,
            thread: Some(thread),
        })
    }

    // ── Audio thread event loop ────────────────────────────────────

    fn run(cmd_rx: &mpsc::Receiver<AudioCommand>, init_tx: &mpsc::Sender<Result<(), VoiceError>>) {
        let (_stream, handle) = match OutputStream::try_default() {
            Ok(pair) => pair,
            Err(e) => {
                let _ = init_tx.send(Err(VoiceError::OutputDevice(e.to_string())));
                return;
            }
        };
        let _ = init_tx.send(Ok(()));
        info!(target: "parley.voice", "Audio output opened on default device");

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                AudioCommand::Play { audio, reply } => {
                    let result = Sink::try_new(&handle)
                        .map_err(|e| PlaybackError::Device(e.to_string()))
                        .and_then(|sink| {
                            let source = Decoder::new(Cursor::new(audio.bytes))
                                .map_err(|e| PlaybackError::Decode(e.to_string()))?;
                            sink.append(source);
                            // Blocks this thread only; the async caller is
                            // parked on the oneshot.
                            sink.sleep_until_end();
                            Ok(())
                        });
                    if let Err(e) = &result {
                        warn!(target: "parley.voice", error = %e, "Clip playback failed");
                    }
                    let _ = reply.send(result);
                }
                AudioCommand::Shutdown => break,
            }
        }

        debug!(target: "parley.voice", "Audio thread exiting");
    }
}

#[async_trait]
impl AudioSink for DeviceSink {
    async fn play(&self, audio: SynthesizedAudio) -> Result<(), PlaybackError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(AudioCommand::Play { audio, reply })
            .map_err(|_| PlaybackError::Device("audio thread died".to_string()))?;
        rx.await
            .map_err(|_| PlaybackError::Device("audio thread died".to_string()))?
    }
}

impl Drop for DeviceSink {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(AudioCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

//! Speak command handler.
//!
//! Feeds input lines into a [`PlaybackSequencer`] and reports progress as
//! clips start and finish. Audio comes either from a parley server or from
//! an in-process admission queue in front of ElevenLabs.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parley_core::{
    AudioSink, PlaybackError, PlaybackEvent, PlaybackHandle, PlaybackSequencer, SequencerConfig,
    SynthesisQueue, SynthesisTransport,
};
use parley_voice::{ElevenLabsBackend, FileSink, HttpSynthesisTransport, NullSink};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{admission_config, elevenlabs_config};
use crate::commands::SpeakArgs;
use crate::error::CliError;

/// What happened to the utterances of one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSummary {
    pub played: usize,
    pub skipped: usize,
    pub rejected: usize,
}

/// Execute the speak command.
pub async fn execute(args: SpeakArgs) -> Result<()> {
    let transport = build_transport(&args)?;
    let sink = build_sink(&args).await?;
    let config = SequencerConfig::default().with_max_pending(args.max_pending);

    let (handle, events) = PlaybackSequencer::spawn(transport, sink, config);
    let reporter = tokio::spawn(report(events));

    let accepted = match &args.input {
        Some(path) => {
            let file = tokio::fs::File::open(path).await.map_err(CliError::from)?;
            feed(&handle, BufReader::new(file)).await?
        }
        None => feed(&handle, BufReader::new(tokio::io::stdin())).await?,
    };
    debug!(target: "parley.playback", accepted, "Input finished, waiting for playback");

    handle.join().await.map_err(CliError::from)?;
    let summary = reporter.await?;

    println!(
        "Played {} of {} utterances ({} skipped, {} rejected)",
        summary.played,
        accepted + summary.rejected,
        summary.skipped,
        summary.rejected
    );
    Ok(())
}

fn build_transport(args: &SpeakArgs) -> Result<Arc<dyn SynthesisTransport>, CliError> {
    if args.local {
        let backend = ElevenLabsBackend::new(elevenlabs_config(&args.elevenlabs)?)?;
        let queue = SynthesisQueue::spawn(Arc::new(backend), admission_config(&args.admission));
        info!(target: "parley.playback", "Synthesizing in-process");
        Ok(Arc::new(queue))
    } else {
        let timeout = Duration::from_secs(args.request_timeout);
        let transport = HttpSynthesisTransport::new(&args.server, timeout)?;
        info!(target: "parley.playback", server = %args.server, "Synthesizing via server");
        Ok(Arc::new(transport))
    }
}

async fn build_sink(args: &SpeakArgs) -> Result<Arc<dyn AudioSink>, CliError> {
    if let Some(dir) = &args.out_dir {
        return Ok(Arc::new(FileSink::create(dir).await?));
    }
    if args.dry_run {
        return Ok(Arc::new(NullSink));
    }
    open_device()
}

#[cfg(feature = "device-audio")]
fn open_device() -> Result<Arc<dyn AudioSink>, CliError> {
    Ok(Arc::new(parley_voice::DeviceSink::open()?))
}

#[cfg(not(feature = "device-audio"))]
fn open_device() -> Result<Arc<dyn AudioSink>, CliError> {
    Err(CliError::Config(
        "built without the device-audio feature; pass --out-dir or --dry-run".into(),
    ))
}

/// Enqueue every non-blank line. Returns how many were accepted.
///
/// A full pending list drops the line and keeps reading; any other
/// sequencer error ends the run.
pub(crate) async fn feed<R>(handle: &PlaybackHandle, input: R) -> Result<usize, CliError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut accepted = 0;

    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        match handle.enqueue(text).await {
            Ok(sequence) => {
                debug!(target: "parley.playback", sequence, "Queued line");
                accepted += 1;
            }
            Err(PlaybackError::QueueFull { limit }) => {
                warn!(target: "parley.playback", limit, "Pending list full, dropping line");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(accepted)
}

/// Log sequencer events until the stream ends.
pub(crate) async fn report(mut events: mpsc::UnboundedReceiver<PlaybackEvent>) -> PlaybackSummary {
    let mut summary = PlaybackSummary::default();

    while let Some(event) = events.recv().await {
        match event {
            PlaybackEvent::StateChanged(state) => {
                debug!(target: "parley.playback", ?state, "State changed");
            }
            PlaybackEvent::Enqueued { .. } | PlaybackEvent::Drained => {}
            PlaybackEvent::Rejected { .. } => summary.rejected += 1,
            PlaybackEvent::Started { sequence } => {
                info!(target: "parley.playback", sequence, "Playing");
            }
            PlaybackEvent::Finished { .. } => summary.played += 1,
            PlaybackEvent::Skipped { sequence, reason } => {
                warn!(target: "parley.playback", sequence, %reason, "Skipped utterance");
                summary.skipped += 1;
            }
        }
    }
    summary
}

//! Integration tests for the `PlaybackSequencer`.
//!
//! The transport and sink below sleep on tokio's paused clock and log what
//! they were asked to do, which lets the tests check ordering and the
//! one-active-utterance rule over a whole session.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use parley_core::{
    AdmissionConfig, AudioSink, PlaybackError, PlaybackEvent, PlaybackSequencer, PlaybackState,
    SequencerConfig, SynthesisBackend, SynthesisError, SynthesisQueue, SynthesisTransport,
    SynthesizedAudio,
};
use tokio::sync::mpsc;
use tokio::time::Instant;

// ── Mock transport and sink ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Activity {
    Synthesize(String),
    Play(String),
}

#[derive(Debug, Clone)]
struct Span {
    activity: Activity,
    start: Instant,
    end: Instant,
}

type Journal = Arc<Mutex<Vec<Span>>>;

struct DelayedTransport {
    delays: HashMap<String, Duration>,
    failing: Vec<String>,
    journal: Journal,
}

#[async_trait]
impl SynthesisTransport for DelayedTransport {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, SynthesisError> {
        let start = Instant::now();
        let delay = self.delays.get(text).copied().unwrap_or_default();
        tokio::time::sleep(delay).await;
        self.journal.lock().unwrap().push(Span {
            activity: Activity::Synthesize(text.to_string()),
            start,
            end: Instant::now(),
        });

        if self.failing.iter().any(|t| t == text) {
            return Err(SynthesisError::backend("status 502"));
        }
        Ok(SynthesizedAudio::mpeg(text.as_bytes().to_vec()))
    }
}

struct TimedSink {
    clip_length: Duration,
    journal: Journal,
}

#[async_trait]
impl AudioSink for TimedSink {
    async fn play(&self, audio: SynthesizedAudio) -> Result<(), PlaybackError> {
        let start = Instant::now();
        tokio::time::sleep(self.clip_length).await;
        self.journal.lock().unwrap().push(Span {
            activity: Activity::Play(String::from_utf8_lossy(&audio.bytes).into_owned()),
            start,
            end: Instant::now(),
        });
        Ok(())
    }
}

// ── Helpers ────────────────────────────────────────────────────────

fn rig(
    delays: &[(&str, u64)],
    failing: &[&str],
) -> (Arc<DelayedTransport>, Arc<TimedSink>, Journal) {
    let journal = Journal::default();
    let transport = DelayedTransport {
        delays: delays
            .iter()
            .map(|(t, ms)| ((*t).to_string(), Duration::from_millis(*ms)))
            .collect(),
        failing: failing.iter().map(|t| (*t).to_string()).collect(),
        journal: Arc::clone(&journal),
    };
    let sink = TimedSink {
        clip_length: Duration::from_millis(30),
        journal: Arc::clone(&journal),
    };
    (Arc::new(transport), Arc::new(sink), journal)
}

async fn drain(mut events: mpsc::UnboundedReceiver<PlaybackEvent>) -> Vec<PlaybackEvent> {
    let mut out = Vec::new();
    while let Some(event) = events.recv().await {
        out.push(event);
    }
    out
}

fn played(journal: &Journal) -> Vec<String> {
    journal
        .lock()
        .unwrap()
        .iter()
        .filter_map(|span| match &span.activity {
            Activity::Play(text) => Some(text.clone()),
            Activity::Synthesize(_) => None,
        })
        .collect()
}

fn assert_no_overlap(journal: &Journal) {
    let mut spans = journal.lock().unwrap().clone();
    spans.sort_by_key(|span| span.start);
    for pair in spans.windows(2) {
        assert!(
            pair[0].end <= pair[1].start,
            "{:?} overlaps {:?}",
            pair[0].activity,
            pair[1].activity
        );
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn slow_first_utterance_still_plays_first() {
    let (transport, sink, journal) = rig(&[("hello", 100), ("world", 10)], &[]);
    let (handle, events) = PlaybackSequencer::spawn(transport, sink, SequencerConfig::default());

    assert_eq!(handle.enqueue("hello").await.unwrap(), 1);
    assert_eq!(handle.enqueue("world").await.unwrap(), 2);
    handle.join().await.unwrap();

    assert_eq!(played(&journal), vec!["hello", "world"]);
    assert_no_overlap(&journal);

    let events = drain(events).await;
    let started: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            PlaybackEvent::Started { sequence } => Some(*sequence),
            _ => None,
        })
        .collect();
    assert_eq!(started, vec![1, 2]);
    assert_eq!(events.last(), Some(&PlaybackEvent::Drained));
}

#[tokio::test(start_paused = true)]
async fn burst_of_utterances_plays_in_arrival_order() {
    let (transport, sink, journal) = rig(&[("one", 40), ("two", 5), ("three", 20), ("four", 1)], &[]);
    let (handle, _events) = PlaybackSequencer::spawn(transport, sink, SequencerConfig::default());

    for text in ["one", "two", "three", "four"] {
        handle.enqueue(text).await.unwrap();
    }
    handle.join().await.unwrap();

    assert_eq!(played(&journal), vec!["one", "two", "three", "four"]);
    assert_no_overlap(&journal);
}

#[tokio::test(start_paused = true)]
async fn failed_synthesis_is_skipped_not_stalled() {
    let (transport, sink, journal) = rig(&[], &["broken"]);
    let (handle, events) = PlaybackSequencer::spawn(transport, sink, SequencerConfig::default());

    handle.enqueue("before").await.unwrap();
    handle.enqueue("broken").await.unwrap();
    handle.enqueue("after").await.unwrap();
    handle.join().await.unwrap();

    assert_eq!(played(&journal), vec!["before", "after"]);

    let events = drain(events).await;
    assert!(events.iter().any(|e| matches!(
        e,
        PlaybackEvent::Skipped { sequence: 2, reason } if reason.contains("502")
    )));
}

#[tokio::test(start_paused = true)]
async fn bounded_pending_list_rejects_overflow() {
    let (transport, sink, journal) = rig(&[("a", 50)], &[]);
    let config = SequencerConfig::default().with_max_pending(Some(1));
    let (handle, events) = PlaybackSequencer::spawn(transport, sink, config);

    // "a" is synthesizing, "b" fills the pending list.
    handle.enqueue("a").await.unwrap();
    handle.enqueue("b").await.unwrap();
    let err = handle.enqueue("c").await.unwrap_err();
    assert!(matches!(err, PlaybackError::QueueFull { limit: 1 }));

    handle.join().await.unwrap();
    assert_eq!(played(&journal), vec!["a", "b"]);
    assert!(drain(events).await.contains(&PlaybackEvent::Rejected { limit: 1 }));
}

#[tokio::test(start_paused = true)]
async fn state_returns_to_idle_between_bursts() {
    let (transport, sink, _journal) = rig(&[], &[]);
    let (handle, mut events) = PlaybackSequencer::spawn(transport, sink, SequencerConfig::default());

    handle.enqueue("first").await.unwrap();
    while let Some(event) = events.recv().await {
        if event == PlaybackEvent::Drained {
            break;
        }
    }

    handle.enqueue("second").await.unwrap();
    handle.join().await.unwrap();

    let rest = drain(events).await;
    assert_eq!(
        rest.first(),
        Some(&PlaybackEvent::Enqueued { sequence: 2 })
    );
    assert!(rest.contains(&PlaybackEvent::StateChanged(PlaybackState::Idle)));
}

#[tokio::test(start_paused = true)]
async fn sequencer_over_local_admission_queue() {
    struct EchoBackend;

    #[async_trait]
    impl SynthesisBackend for EchoBackend {
        async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, SynthesisError> {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(SynthesizedAudio::mpeg(text.as_bytes().to_vec()))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    let journal = Journal::default();
    let sink = Arc::new(TimedSink {
        clip_length: Duration::from_millis(10),
        journal: Arc::clone(&journal),
    });
    let queue = SynthesisQueue::spawn(Arc::new(EchoBackend), AdmissionConfig::default());
    let (handle, _events) =
        PlaybackSequencer::spawn(Arc::new(queue), sink, SequencerConfig::default());

    for text in ["x", "y", "z"] {
        handle.enqueue(text).await.unwrap();
    }
    handle.join().await.unwrap();

    assert_eq!(played(&journal), vec!["x", "y", "z"]);
}

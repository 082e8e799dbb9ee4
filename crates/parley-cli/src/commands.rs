//! Main commands enum and subcommand arguments.
//!
//! Every setting can come from a flag or from the environment (a `.env`
//! file is loaded before parsing). Flags win.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use parley_axum::DEFAULT_PORT;
use parley_voice::DEFAULT_ELEVENLABS_BASE_URL;

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the synthesis server (POST /tts, POST /upload)
    Serve(ServeArgs),

    /// Speak lines of text in order, one at a time
    ///
    /// Reads one utterance per line from stdin (or --input) and plays the
    /// synthesized audio strictly in input order.
    Speak(SpeakArgs),
}

/// ElevenLabs credentials and voice selection.
#[derive(Args, Debug, Clone)]
pub struct ElevenLabsArgs {
    /// ElevenLabs API key
    #[arg(long = "elevenlabs-api-key", env = "ELEVENLABS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// ElevenLabs voice id
    #[arg(long = "voice-id", env = "ELEVENLABS_VOICE_ID")]
    pub voice_id: Option<String>,

    /// ElevenLabs model id (backend default when unset)
    #[arg(long = "model-id", env = "ELEVENLABS_MODEL_ID")]
    pub model_id: Option<String>,

    /// ElevenLabs API base URL
    #[arg(
        long = "elevenlabs-base-url",
        env = "ELEVENLABS_BASE_URL",
        default_value = DEFAULT_ELEVENLABS_BASE_URL
    )]
    pub base_url: String,

    /// Voice stability, 0.0 to 1.0
    #[arg(long, env = "ELEVENLABS_STABILITY", default_value_t = 0.5)]
    pub stability: f32,

    /// Voice similarity boost, 0.0 to 1.0
    #[arg(long = "similarity-boost", env = "ELEVENLABS_SIMILARITY_BOOST", default_value_t = 0.5)]
    pub similarity_boost: f32,
}

/// Admission limits for the synthesis queue.
#[derive(Args, Debug, Clone)]
pub struct AdmissionArgs {
    /// Maximum concurrent calls to the synthesis backend
    #[arg(long, env = "MAX_CONCURRENCY", default_value = "2")]
    pub max_concurrency: NonZeroUsize,

    /// Maximum jobs waiting for a slot (unbounded when unset)
    #[arg(long, env = "MAX_WAITING")]
    pub max_waiting: Option<usize>,

    /// Per-job synthesis timeout in seconds (none when unset)
    #[arg(long = "job-timeout", env = "TTS_JOB_TIMEOUT", value_name = "SECONDS")]
    pub job_timeout: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    #[command(flatten)]
    pub admission: AdmissionArgs,

    /// Allowed CORS origins, comma separated (all origins when unset)
    #[arg(long = "allowed-origin", env = "ALLOWED_ORIGIN")]
    pub allowed_origin: Option<String>,

    #[command(flatten)]
    pub elevenlabs: ElevenLabsArgs,

    /// Cloudflare account id for the Whisper relay
    #[arg(long = "cloudflare-account", env = "CLOUDFLARE_ACCT_ID")]
    pub cloudflare_account: Option<String>,

    /// Cloudflare API token for the Whisper relay
    #[arg(long = "cloudflare-api-key", env = "CLOUDFLARE_API_KEY", hide_env_values = true)]
    pub cloudflare_api_key: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SpeakArgs {
    /// parley server to request audio from
    #[arg(
        long,
        env = "PARLEY_SERVER",
        default_value = "http://localhost:3001",
        conflicts_with = "local"
    )]
    pub server: String,

    /// Synthesize in-process instead of calling a server
    #[arg(long)]
    pub local: bool,

    #[command(flatten)]
    pub admission: AdmissionArgs,

    #[command(flatten)]
    pub elevenlabs: ElevenLabsArgs,

    /// Read utterances from this file instead of stdin
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Write clips to this directory instead of playing them
    #[arg(long = "out-dir", conflicts_with = "dry_run")]
    pub out_dir: Option<PathBuf>,

    /// Synthesize but discard the audio
    #[arg(long)]
    pub dry_run: bool,

    /// Maximum utterances waiting for synthesis (unbounded when unset)
    #[arg(long)]
    pub max_pending: Option<usize>,

    /// HTTP request timeout in seconds for the server transport
    #[arg(long = "request-timeout", default_value_t = 30, value_name = "SECONDS")]
    pub request_timeout: u64,
}

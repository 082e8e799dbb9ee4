#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

#[cfg(feature = "device-audio")]
pub mod device;
pub mod elevenlabs;
pub mod error;
pub mod sink;
pub mod transport;
pub mod whisper;

#[cfg(feature = "device-audio")]
pub use device::DeviceSink;
pub use elevenlabs::{DEFAULT_ELEVENLABS_BASE_URL, ElevenLabsBackend, ElevenLabsConfig};
pub use error::VoiceError;
pub use sink::{FileSink, NullSink};
pub use transport::HttpSynthesisTransport;
pub use whisper::{CloudflareWhisper, DEFAULT_CLOUDFLARE_BASE_URL, WhisperConfig};

// Silence unused dev-dependency warnings for integration-only helpers
#[cfg(test)]
use axum as _;

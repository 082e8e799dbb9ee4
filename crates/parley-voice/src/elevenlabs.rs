//! ElevenLabs text-to-speech backend.
//!
//! One `POST {base}/text-to-speech/{voice_id}` per job, answered with a
//! complete MP3 clip. Any transport error or non-2xx status becomes
//! [`SynthesisError::BackendUnavailable`]; no retries are attempted here.

use std::time::Duration;

use async_trait::async_trait;
use parley_core::{AUDIO_MPEG, SynthesisBackend, SynthesisError, SynthesizedAudio};
use serde::Serialize;
use tracing::debug;

use crate::error::{VoiceError, require};

/// Default API base.
pub const DEFAULT_ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io/v1";

/// Configuration for [`ElevenLabsBackend`].
///
/// # Example
///
/// ```
/// use parley_voice::ElevenLabsConfig;
/// use std::time::Duration;
///
/// let config = ElevenLabsConfig::new("xi-key", "voice-123")
///     .with_model_id(Some("eleven_turbo_v2".to_string()))
///     .with_timeout(Duration::from_secs(20));
/// ```
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    pub(crate) api_key: String,
    pub(crate) voice_id: String,
    pub(crate) model_id: Option<String>,
    pub(crate) base_url: String,
    pub(crate) timeout: Duration,
    pub(crate) stability: f32,
    pub(crate) similarity_boost: f32,
}

impl ElevenLabsConfig {
    /// Create a configuration for the given credentials and voice.
    #[must_use]
    pub fn new(api_key: impl Into<String>, voice_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            voice_id: voice_id.into(),
            model_id: None,
            base_url: DEFAULT_ELEVENLABS_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            stability: 0.5,
            similarity_boost: 0.5,
        }
    }

    /// Select a model. `None` leaves the choice to the API.
    #[must_use]
    pub fn with_model_id(mut self, model_id: Option<String>) -> Self {
        self.model_id = model_id;
        self
    }

    /// Override the API base URL (no trailing slash needed).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// HTTP request timeout. Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Voice stability and similarity boost, both `0.0..=1.0`.
    /// Defaults to `0.5` / `0.5`.
    #[must_use]
    pub const fn with_voice_settings(mut self, stability: f32, similarity_boost: f32) -> Self {
        self.stability = stability;
        self.similarity_boost = similarity_boost;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/text-to-speech/{}",
            self.base_url.trim_end_matches('/'),
            self.voice_id
        )
    }
}

#[derive(Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_id: Option<&'a str>,
    voice_settings: VoiceSettings,
}

#[derive(Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

/// [`SynthesisBackend`] backed by the ElevenLabs REST API.
pub struct ElevenLabsBackend {
    client: reqwest::Client,
    config: ElevenLabsConfig,
}

impl ElevenLabsBackend {
    pub fn new(config: ElevenLabsConfig) -> Result<Self, VoiceError> {
        require(&config.api_key, "ELEVENLABS_API_KEY")?;
        require(&config.voice_id, "ELEVENLABS_VOICE_ID")?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("parley-voice/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl SynthesisBackend for ElevenLabsBackend {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, SynthesisError> {
        let body = TtsRequest {
            text,
            model_id: self.config.model_id.as_deref(),
            voice_settings: VoiceSettings {
                stability: self.config.stability,
                similarity_boost: self.config.similarity_boost,
            },
        };

        let response = self
            .client
            .post(self.config.endpoint())
            .header("xi-api-key", &self.config.api_key)
            .header(reqwest::header::ACCEPT, AUDIO_MPEG)
            .json(&body)
            .send()
            .await
            .map_err(SynthesisError::backend)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(SynthesisError::BackendUnavailable(format!(
                "ElevenLabs returned {status}: {}",
                detail.trim()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(AUDIO_MPEG)
            .to_string();
        let bytes = response.bytes().await.map_err(SynthesisError::backend)?;

        debug!(target: "parley.voice", bytes = bytes.len(), "ElevenLabs synthesis complete");
        Ok(SynthesizedAudio::new(bytes, content_type))
    }

    fn name(&self) -> &str {
        "elevenlabs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ElevenLabsConfig::new("key", "voice");
        assert_eq!(config.base_url, DEFAULT_ELEVENLABS_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.model_id.is_none());
        assert!((config.stability - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn endpoint_joins_base_and_voice() {
        let config = ElevenLabsConfig::new("key", "abc").with_base_url("http://localhost:9000/v1/");
        assert_eq!(config.endpoint(), "http://localhost:9000/v1/text-to-speech/abc");
    }

    #[test]
    fn request_body_shape() {
        let body = TtsRequest {
            text: "hi",
            model_id: None,
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.5,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["text"], "hi");
        assert!(json.get("model_id").is_none());
        assert_eq!(json["voice_settings"]["similarity_boost"], 0.5);
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let err = ElevenLabsBackend::new(ElevenLabsConfig::new(" ", "voice"))
            .err()
            .unwrap();
        assert!(matches!(err, VoiceError::MissingSetting("ELEVENLABS_API_KEY")));
    }
}

//! Cloudflare Workers AI Whisper transcription backend.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parley_core::{Transcription, TranscriptionBackend, TranscriptionError};
use tracing::debug;

use crate::error::{VoiceError, require};

pub const DEFAULT_CLOUDFLARE_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

const WHISPER_MODEL: &str = "@cf/openai/whisper";

/// Configuration for [`CloudflareWhisper`].
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    pub(crate) account_id: String,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) timeout: Duration,
}

impl WhisperConfig {
    #[must_use]
    pub fn new(account_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            api_key: api_key.into(),
            base_url: DEFAULT_CLOUDFLARE_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/accounts/{}/ai/run/{WHISPER_MODEL}",
            self.base_url.trim_end_matches('/'),
            self.account_id
        )
    }
}

/// Relays recordings to Whisper and returns its JSON answer.
pub struct CloudflareWhisper {
    client: reqwest::Client,
    config: WhisperConfig,
}

impl CloudflareWhisper {
    pub fn new(config: WhisperConfig) -> Result<Self, VoiceError> {
        require(&config.account_id, "CLOUDFLARE_ACCT_ID")?;
        require(&config.api_key, "CLOUDFLARE_API_KEY")?;

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl TranscriptionBackend for CloudflareWhisper {
    async fn transcribe(&self, audio: Bytes) -> Result<Transcription, TranscriptionError> {
        if audio.is_empty() {
            return Err(TranscriptionError::EmptyAudio);
        }
        let size = audio.len();

        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(audio)
            .send()
            .await
            .map_err(|e| TranscriptionError::BackendUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranscriptionError::BackendUnavailable(format!(
                "Whisper returned {status}"
            )));
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TranscriptionError::BackendUnavailable(e.to_string()))?;

        // { "success": true, "result": { "text": "..." } }
        let text = raw
            .pointer("/result/text")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();

        debug!(target: "parley.voice", bytes = size, chars = text.len(), "Transcription complete");
        Ok(Transcription { text, raw })
    }
}

//! Client side of `POST /tts`.

use std::time::Duration;

use async_trait::async_trait;
use parley_core::{AUDIO_MPEG, SynthesisError, SynthesisTransport, SynthesizedAudio};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::VoiceError;

/// [`SynthesisTransport`] that asks a parley server for audio.
pub struct HttpSynthesisTransport {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct TtsBody<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpSynthesisTransport {
    /// `server` is the base URL of a parley server, e.g.
    /// `http://localhost:3001`.
    pub fn new(server: &str, timeout: Duration) -> Result<Self, VoiceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/tts", server.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl SynthesisTransport for HttpSynthesisTransport {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, SynthesisError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&TtsBody { text })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SynthesisError::backend(format!("request to {} timed out", self.endpoint))
                } else {
                    SynthesisError::backend(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or(AUDIO_MPEG)
                .to_string();
            let bytes = response.bytes().await.map_err(SynthesisError::backend)?;
            return Ok(SynthesizedAudio::new(bytes, content_type));
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map_or_else(|_| status.to_string(), |body| body.error);
        Err(error_for_status(status, message))
    }
}

/// Map a server error response back onto the core taxonomy.
fn error_for_status(status: StatusCode, message: String) -> SynthesisError {
    // Queue-full and timeout answers carry no limit/duration on the wire,
    // so everything except a rejected request is a backend failure here.
    if status == StatusCode::BAD_REQUEST {
        SynthesisError::MalformedRequest(message)
    } else {
        SynthesisError::BackendUnavailable(format!("server returned {status}: {message}"))
    }
}

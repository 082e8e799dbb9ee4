//! Axum handler for `POST /upload` (speech-to-text relay).

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use parley_core::{TranscriptionBackend, TranscriptionError};

use crate::error::HttpError;
use crate::state::AppState;

/// `POST /upload`
///
/// Relays the raw request body to the transcription backend and answers
/// with its JSON verbatim. Not routed through the admission queue.
pub async fn transcribe(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, HttpError> {
    let transcriber = state
        .transcriber
        .as_ref()
        .ok_or(TranscriptionError::NotConfigured)?;

    if body.is_empty() {
        return Err(TranscriptionError::EmptyAudio.into());
    }

    let transcription = transcriber.transcribe(body).await?;
    tracing::debug!(target: "parley.server", chars = transcription.text.len(), "Upload transcribed");
    Ok(Json(transcription.raw))
}

//! Axum handlers for the `/tts` endpoints.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use parley_core::{AUDIO_MPEG, AdmissionSnapshot};
use serde::Deserialize;

use crate::error::HttpError;
use crate::state::AppState;

// ── Request body shapes ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    pub text: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// `POST /tts`
///
/// Waits for a slot in the admission queue, then answers with the raw
/// audio as `audio/mpeg`, whatever type the backend reported. If the client
/// disconnects while the job is still waiting, the job is withdrawn.
pub async fn synthesize(
    State(state): State<AppState>,
    payload: Result<Json<TtsRequest>, JsonRejection>,
) -> Result<Response, HttpError> {
    let Json(request) = payload?;

    let audio = state.queue.submit(request.text).await?;
    Ok(([(header::CONTENT_TYPE, AUDIO_MPEG)], audio.bytes).into_response())
}

/// `GET /tts/status`
pub async fn status(State(state): State<AppState>) -> Result<Json<AdmissionSnapshot>, HttpError> {
    Ok(Json(state.queue.snapshot().await?))
}

//! Command handlers.
//!
//! Each submodule exposes an `execute` function for one subcommand. The
//! helpers here turn parsed arguments into library configuration.

pub mod serve;
pub mod speak;

use std::time::Duration;

use parley_core::AdmissionConfig;
use parley_voice::ElevenLabsConfig;

use crate::commands::{AdmissionArgs, ElevenLabsArgs};
use crate::error::CliError;

pub(crate) fn admission_config(args: &AdmissionArgs) -> AdmissionConfig {
    AdmissionConfig::new(args.max_concurrency)
        .with_max_waiting(args.max_waiting)
        .with_job_timeout(args.job_timeout.map(Duration::from_secs))
}

pub(crate) fn elevenlabs_config(args: &ElevenLabsArgs) -> Result<ElevenLabsConfig, CliError> {
    let api_key = non_empty(args.api_key.as_deref())
        .ok_or_else(|| CliError::Config("ELEVENLABS_API_KEY is not set".into()))?;
    let voice_id = non_empty(args.voice_id.as_deref())
        .ok_or_else(|| CliError::Config("ELEVENLABS_VOICE_ID is not set".into()))?;

    let stability = unit_interval(args.stability, "ELEVENLABS_STABILITY")?;
    let similarity_boost = unit_interval(args.similarity_boost, "ELEVENLABS_SIMILARITY_BOOST")?;

    Ok(ElevenLabsConfig::new(api_key, voice_id)
        .with_model_id(non_empty(args.model_id.as_deref()).map(str::to_owned))
        .with_base_url(args.base_url.clone())
        .with_voice_settings(stability, similarity_boost))
}

fn unit_interval(value: f32, name: &str) -> Result<f32, CliError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(CliError::Config(format!("{name} must be between 0.0 and 1.0, got {value}")))
    }
}

/// Treat unset and blank the same.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

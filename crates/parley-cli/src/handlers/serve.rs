//! Serve command handler.

use anyhow::Result;
use parley_axum::{CorsConfig, ServerConfig, start_server};
use parley_voice::WhisperConfig;
use tracing::info;

use super::{admission_config, elevenlabs_config, non_empty};
use crate::commands::ServeArgs;
use crate::error::CliError;

/// Execute the serve command.
pub async fn execute(args: ServeArgs) -> Result<()> {
    let config = server_config(&args)?;
    info!(
        target: "parley.server",
        port = config.port,
        max_concurrency = config.admission.max_concurrency.get(),
        max_waiting = ?config.admission.max_waiting,
        job_timeout = ?config.admission.job_timeout,
        transcription = config.transcription.is_some(),
        "Starting synthesis server"
    );
    start_server(config).await
}

pub(crate) fn server_config(args: &ServeArgs) -> Result<ServerConfig, CliError> {
    Ok(ServerConfig::new(elevenlabs_config(&args.elevenlabs)?)
        .with_port(args.port)
        .with_admission(admission_config(&args.admission))
        .with_cors(CorsConfig::from_list(args.allowed_origin.as_deref()))
        .with_transcription(whisper_config(args)?))
}

fn whisper_config(args: &ServeArgs) -> Result<Option<WhisperConfig>, CliError> {
    let account = non_empty(args.cloudflare_account.as_deref());
    let key = non_empty(args.cloudflare_api_key.as_deref());
    match (account, key) {
        (Some(account), Some(key)) => Ok(Some(WhisperConfig::new(account, key))),
        (None, None) => {
            info!(target: "parley.server", "Cloudflare credentials not set, /upload disabled");
            Ok(None)
        }
        (Some(_), None) => Err(CliError::Config(
            "CLOUDFLARE_ACCT_ID is set but CLOUDFLARE_API_KEY is not".into(),
        )),
        (None, Some(_)) => Err(CliError::Config(
            "CLOUDFLARE_API_KEY is set but CLOUDFLARE_ACCT_ID is not".into(),
        )),
    }
}

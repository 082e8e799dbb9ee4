//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the web adapter. All concrete backends are instantiated here.

use std::sync::Arc;

use anyhow::{Context, Result};
use parley_core::{AdmissionConfig, SynthesisBackend, SynthesisQueue, TranscriptionBackend};
use parley_voice::{CloudflareWhisper, ElevenLabsBackend, ElevenLabsConfig, WhisperConfig};
use tracing::{info, warn};

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3001;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

impl CorsConfig {
    /// Parse a comma-separated origin list. Blank or missing input allows
    /// every origin.
    pub fn from_list(list: Option<&str>) -> Self {
        let origins: Vec<String> = list
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(ToString::to_string)
            .collect();

        if origins.is_empty() {
            Self::AllowAll
        } else {
            Self::AllowOrigins(origins)
        }
    }
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the HTTP server.
    pub port: u16,
    /// Admission limits for the synthesis queue.
    pub admission: AdmissionConfig,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Synthesis backend settings.
    pub synthesis: ElevenLabsConfig,
    /// Transcription backend settings. `None` disables `POST /upload`.
    pub transcription: Option<WhisperConfig>,
}

impl ServerConfig {
    /// Create config with default port, limits and CORS.
    pub fn new(synthesis: ElevenLabsConfig) -> Self {
        Self {
            port: DEFAULT_PORT,
            admission: AdmissionConfig::default(),
            cors: CorsConfig::default(),
            synthesis,
            transcription: None,
        }
    }

    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_admission(mut self, admission: AdmissionConfig) -> Self {
        self.admission = admission;
        self
    }

    #[must_use]
    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.cors = cors;
        self
    }

    #[must_use]
    pub fn with_transcription(mut self, transcription: Option<WhisperConfig>) -> Self {
        self.transcription = transcription;
        self
    }
}

/// Application context for the Axum adapter.
pub struct AxumContext {
    /// Admission-controlled synthesis queue (one per process).
    pub queue: SynthesisQueue,
    /// Speech-to-text relay, if configured.
    pub transcriber: Option<Arc<dyn TranscriptionBackend>>,
}

impl AxumContext {
    /// Wire a context from already-built backends.
    ///
    /// Spawns the admission queue actor, so it must be called inside a
    /// tokio runtime.
    pub fn new(
        backend: Arc<dyn SynthesisBackend>,
        admission: AdmissionConfig,
        transcriber: Option<Arc<dyn TranscriptionBackend>>,
    ) -> Self {
        Self {
            queue: SynthesisQueue::spawn(backend, admission),
            transcriber,
        }
    }
}

/// Build the real backends from configuration.
pub fn bootstrap(config: &ServerConfig) -> Result<AxumContext> {
    let backend: Arc<dyn SynthesisBackend> = Arc::new(
        ElevenLabsBackend::new(config.synthesis.clone())
            .context("Failed to configure synthesis backend")?,
    );

    let transcriber: Option<Arc<dyn TranscriptionBackend>> = match &config.transcription {
        Some(whisper) => Some(Arc::new(
            CloudflareWhisper::new(whisper.clone())
                .context("Failed to configure transcription backend")?,
        )),
        None => {
            warn!(target: "parley.server", "No transcription credentials, POST /upload disabled");
            None
        }
    };

    info!(
        target: "parley.server",
        backend = backend.name(),
        max_concurrency = config.admission.max_concurrency.get(),
        max_waiting = ?config.admission.max_waiting,
        job_timeout = ?config.admission.job_timeout,
        cors = ?config.cors,
        "Server bootstrap complete"
    );

    Ok(AxumContext::new(
        backend,
        config.admission.clone(),
        transcriber,
    ))
}

/// Start the web server on the configured port.
///
/// Runs until Ctrl-C; in-flight requests are allowed to finish.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    use tokio::net::TcpListener;

    let ctx = bootstrap(&config)?;
    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(target: "parley.server", "parley server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(target: "parley.server", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(target: "parley.server", error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

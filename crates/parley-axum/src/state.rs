//! Shared application state type.

use crate::bootstrap::AxumContext;
use std::sync::Arc;

/// Application state shared across all handlers.
///
/// An Arc-wrapped `AxumContext` holding the admission queue and the
/// optional transcription backend.
pub type AppState = Arc<AxumContext>;

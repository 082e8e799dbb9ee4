//! HTTP handlers.
//!
//! Handlers are thin wrappers: each makes one call into the context and
//! maps the result onto a response.

pub mod tts;
pub mod upload;

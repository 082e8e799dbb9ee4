#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

// Only used by the binary
use dotenvy as _;
use tracing_subscriber as _;

#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;

pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;

//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Speech synthesis server and ordered playback client.
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(about = "Admission-controlled speech synthesis server and in-order playback client")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

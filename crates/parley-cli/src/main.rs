//! `parley` entry point: load `.env`, parse arguments, set up logging and
//! dispatch to a handler.

use clap::{CommandFactory, Parser};
use parley_cli::handlers::{serve, speak};
use parley_cli::{Cli, CliError, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env before parsing so env-backed flags see it
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        std::process::exit(code);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve(args)) => serve::execute(args).await,
        Some(Commands::Speak(args)) => speak::execute(args).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

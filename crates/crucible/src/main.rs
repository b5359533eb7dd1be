mod cli;
mod commands;
mod error;
mod output;
mod state;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose, cli.global.debug);

    // Ctrl-C cancels whatever is in flight
    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            watcher.cancel();
        }
    });

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli, &cancel).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, debug: bool) {
    let filter = match (debug, verbosity) {
        (_, 3..) => "trace",
        (true, _) | (false, 2) => "debug",
        (false, 1) => "info",
        (false, _) => "warn",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, cancel: &CancellationToken) -> Result<(), CliError> {
    tracing::debug!(command = ?cli.command, "dispatching command");
    // Dropping the dispatch future abandons any request still on the wire.
    tokio::select! {
        result = commands::dispatch(cli.command, &cli.global) => result,
        () = cancel.cancelled() => Err(CliError::Cancelled),
    }
}

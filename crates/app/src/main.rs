//! Conform command-line entry point.

use std::process::ExitCode;

use clap::Parser;
use conform::{Cli, EXIT_CONFIG, dispatch, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!("conform v{}", env!("CARGO_PKG_VERSION"));

    match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Run aborted");
            eprintln!("error: {e}");
            ExitCode::from(EXIT_CONFIG)
        }
    }
}

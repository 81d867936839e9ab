use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use ticketdesk::cli::Cli;

/// Environment variable holding the log filter, e.g. `TICKETDESK_LOG=debug`
const LOG_ENV: &str = "TICKETDESK_LOG";

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("ticketdesk=debug,warn")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Logs go to stderr so stdout stays clean for --json
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

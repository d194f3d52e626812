use std::io;
use std::process::ExitCode;

use clap::Parser;
use helpdesk_core::{AppError, SystemClock};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use helpdesk_cli::app::{open_session, run, RunError};
use helpdesk_cli::cli::Cli;
use helpdesk_cli::config::Config;

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::resolve(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(1);
        }
    };
    init_tracing(&config);
    debug!(?config, "configuration resolved");

    let result = open_session(&config, SystemClock)
        .map_err(RunError::from)
        .and_then(|mut session| {
            let stdin = io::stdin();
            run(
                &mut session,
                cli.command.into_command(),
                cli.json,
                stdin.lock(),
                io::stdout(),
            )
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let exit = e.exit_code();
            let err = AppError::from(e);
            if let Some(details) = &err.details {
                debug!(code = %err.code, %details, "failure details");
            }
            eprintln!("error: {err}");
            exit
        }
    }
}

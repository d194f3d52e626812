//! Wiring between parsed arguments, the store and the output stream.

use std::io::{BufRead, Write};
use std::process::ExitCode;

use helpdesk_core::store::{open_ephemeral_store, open_store};
use helpdesk_core::{
    AppError, Clock, Command, IncidentRepository, Session, SessionError, SqliteIncidentRepository,
};
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::render::{render_json, render_outcome};
use crate::shell::Shell;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("{0}")]
    App(#[from] AppError),
}

impl RunError {
    /// 2 when the desk refused the request, 1 for everything else.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Session(SessionError::Lifecycle(_)) => ExitCode::from(2),
            _ => ExitCode::from(1),
        }
    }
}

impl From<RunError> for AppError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::Session(e) => e.into(),
            RunError::App(e) => e,
        }
    }
}

pub fn open_session<C: Clock>(
    config: &Config,
    clock: C,
) -> Result<Session<SqliteIncidentRepository, C>, AppError> {
    let repo = if config.ephemeral {
        info!("using in-memory store");
        open_ephemeral_store()?
    } else {
        info!(path = %config.db_path.display(), "opening store");
        open_store(&config.db_path)?
    };
    let (session, _) = Session::open(repo, clock)?;
    Ok(session)
}

/// Execute a single command and print its outcome.
pub fn run_command<R, C, W>(
    session: &mut Session<R, C>,
    command: Command,
    json: bool,
    out: &mut W,
) -> Result<(), RunError>
where
    R: IncidentRepository,
    C: Clock,
    W: Write,
{
    let outcome = session.execute(command)?;
    let text = if json {
        let mut text = render_json(&outcome)?;
        text.push('\n');
        text
    } else {
        render_outcome(&outcome)
    };
    out.write_all(text.as_bytes()).map_err(|e| {
        AppError::new("OUTPUT_WRITE_FAILED", "Failed to write output").with_details(e.to_string())
    })?;
    Ok(())
}

/// Run one command, or the interactive menu when `command` is `None`.
pub fn run<R, C, I, W>(
    session: &mut Session<R, C>,
    command: Option<Command>,
    json: bool,
    input: I,
    mut out: W,
) -> Result<(), RunError>
where
    R: IncidentRepository,
    C: Clock,
    I: BufRead,
    W: Write,
{
    match command {
        Some(command) => run_command(session, command, json, &mut out),
        None => {
            Shell::new(input, out).run(session)?;
            Ok(())
        }
    }
}

use thiserror::Error;
use tracing::error;

use crate::clock::Clock;
use crate::command::{dispatch, Command, Outcome};
use crate::domain::ValidationWarning;
use crate::error::{AppError, LifecycleError};
use crate::lifecycle::IncidentDesk;
use crate::repo::IncidentRepository;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// The in-memory change was applied but could not be persisted.
    #[error("{0}")]
    Storage(AppError),
}

impl SessionError {
    pub fn code(&self) -> &str {
        match self {
            Self::Lifecycle(e) => e.code(),
            Self::Storage(e) => &e.code,
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Lifecycle(e) => e.into(),
            SessionError::Storage(e) => e,
        }
    }
}

/// A desk paired with the store it was loaded from and the clock that stamps its changes.
///
/// The desk is the source of truth for the session: a failed save is reported but the
/// in-memory change is kept.
pub struct Session<R, C> {
    desk: IncidentDesk,
    repo: R,
    clock: C,
}

impl<R: IncidentRepository, C: Clock> Session<R, C> {
    /// Load every stored record into a fresh desk. Records breaking an invariant are kept and
    /// reported as warnings.
    pub fn open(repo: R, clock: C) -> Result<(Self, Vec<ValidationWarning>), AppError> {
        let records = repo.load_all()?;
        let (desk, warnings) = IncidentDesk::from_records(records);
        Ok((Self { desk, repo, clock }, warnings))
    }

    pub fn execute(&mut self, command: Command) -> Result<Outcome, SessionError> {
        let now = self.clock.now();
        let outcome = dispatch(&mut self.desk, command, now)?;

        if let Some(changed) = outcome.changed() {
            if let Err(e) = self.repo.save(changed) {
                error!(code = %changed.code, error = %e, details = ?e.details, "failed to persist incident");
                return Err(SessionError::Storage(e));
            }
        }
        Ok(outcome)
    }

    pub fn desk(&self) -> &IncidentDesk {
        &self.desk
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn into_parts(self) -> (IncidentDesk, R, C) {
        (self.desk, self.repo, self.clock)
    }
}

//! Workstation incident desk: identifier generation, the incident lifecycle and its SQLite store.

pub mod clock;
pub mod command;
pub mod db;
pub mod domain;
pub mod error;
pub mod ident;
pub mod lifecycle;
pub mod normalize;
pub mod repo;
pub mod session;
pub mod store;
pub mod validate;

pub use clock::{Clock, FixedClock, SystemClock};
pub use command::{dispatch, Command, Outcome};
pub use domain::{Incident, IncidentStatus, ValidationWarning};
pub use error::{AppError, LifecycleError};
pub use lifecycle::IncidentDesk;
pub use repo::{IncidentRepository, SqliteIncidentRepository};
pub use session::{Session, SessionError};

#[cfg(test)]
mod tests {
    use super::error::{AppError, LifecycleError};

    #[test]
    fn app_error_is_structured() {
        let err = AppError::new("DB_TEST", "db failed").with_retryable(false);
        assert_eq!(err.code, "DB_TEST");
        assert_eq!(err.message, "db failed");
        assert_eq!(err.retryable, false);
        assert_eq!(err.to_string(), "[DB_TEST] db failed");
    }

    #[test]
    fn lifecycle_errors_convert_with_stable_codes() {
        let err: AppError = LifecycleError::AlreadyDeleted("05/03/2024-09:07-1".into()).into();
        assert_eq!(err.code, "INCIDENT_ALREADY_DELETED");
        assert!(err.message.contains("05/03/2024-09:07-1"));
    }
}

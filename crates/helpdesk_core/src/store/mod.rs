use std::path::Path;

use rusqlite::Connection;
use tracing::info;

use crate::error::AppError;
use crate::repo::SqliteIncidentRepository;

fn validate_db_path(path: &Path) -> Result<(), AppError> {
    if path.as_os_str().is_empty() {
        return Err(AppError::new(
            "STORE_INVALID_PATH",
            "Incident store path is empty",
        ));
    }
    if path.is_dir() {
        return Err(AppError::new(
            "STORE_INVALID_PATH",
            "Incident store path must be a file (not a directory)",
        )
        .with_details(path.display().to_string()));
    }
    Ok(())
}

/// Open the SQLite store at `db_path`, creating the file (and parent directories) when missing,
/// and bring its schema up to date.
pub fn open_store_connection(db_path: &Path) -> Result<Connection, AppError> {
    validate_db_path(db_path)?;

    if !db_path.exists() {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::new("STORE_CREATE_FAILED", "Failed to create store directory")
                    .with_details(format!("path={}; err={}", parent.display(), e))
            })?;
        }
        info!(path = %db_path.display(), "creating incident store");
    }

    let mut conn = crate::db::open(db_path).map_err(|e| {
        let details = e.details.clone().unwrap_or_else(|| e.to_string());
        AppError::new("STORE_OPEN_FAILED", "Failed to open incident store").with_details(details)
    })?;

    crate::db::migrate(&mut conn).map_err(|e| {
        let details = e.details.clone().unwrap_or_else(|| e.to_string());
        AppError::new("STORE_MIGRATION_FAILED", "Failed to migrate incident store")
            .with_details(details)
    })?;

    Ok(conn)
}

pub fn open_store(db_path: &Path) -> Result<SqliteIncidentRepository, AppError> {
    open_store_connection(db_path).map(SqliteIncidentRepository::new)
}

/// A migrated in-memory store; nothing outlives the process.
pub fn open_ephemeral_store() -> Result<SqliteIncidentRepository, AppError> {
    let mut conn = crate::db::open_in_memory()?;
    crate::db::migrate(&mut conn)?;
    Ok(SqliteIncidentRepository::new(conn))
}

use std::collections::HashSet;
use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use crate::error::AppError;

const MIGRATION_0001: (&str, &str) = (
    "0001_init.sql",
    include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../migrations/0001_init.sql"
    )),
);

fn migrations() -> Vec<(&'static str, &'static str)> {
    vec![MIGRATION_0001]
}

pub fn open(path: &Path) -> Result<Connection, AppError> {
    Connection::open(path).map_err(|e| {
        AppError::new("DB_OPEN_FAILED", "Failed to open SQLite database")
            .with_details(format!("path={}; err={e}", path.display()))
    })
}

pub fn open_in_memory() -> Result<Connection, AppError> {
    Connection::open_in_memory().map_err(|e| {
        AppError::new("DB_OPEN_FAILED", "Failed to open in-memory SQLite database")
            .with_details(e.to_string())
    })
}

/// Names of migrations already recorded in `_migrations`, ascending.
pub fn applied_migrations(conn: &Connection) -> Result<Vec<String>, AppError> {
    let query_failed = |e: rusqlite::Error| {
        AppError::new("DB_MIGRATIONS_QUERY_FAILED", "Failed to read applied migrations")
            .with_details(e.to_string())
    };

    let mut stmt = conn
        .prepare("SELECT name FROM _migrations ORDER BY name ASC")
        .map_err(query_failed)?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(query_failed)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(query_failed)?);
    }
    Ok(out)
}

/// Apply every embedded migration not yet recorded, each in its own transaction.
pub fn migrate(conn: &mut Connection) -> Result<(), AppError> {
    conn.execute_batch(
        r#"
      CREATE TABLE IF NOT EXISTS _migrations (
        name TEXT PRIMARY KEY NOT NULL,
        applied_at TEXT NOT NULL
      );
    "#,
    )
    .map_err(|e| {
        AppError::new(
            "DB_MIGRATIONS_TABLE_FAILED",
            "Failed to ensure migrations table exists",
        )
        .with_details(e.to_string())
    })?;

    let applied: HashSet<String> = applied_migrations(conn)?.into_iter().collect();

    for (name, sql) in migrations() {
        if applied.contains(name) {
            continue;
        }
        debug!(migration = name, "applying migration");

        let tx = conn.transaction().map_err(|e| {
            AppError::new("DB_TX_FAILED", "Failed to start migration transaction")
                .with_details(e.to_string())
        })?;

        tx.execute_batch(sql).map_err(|e| {
            AppError::new("DB_MIGRATION_FAILED", format!("Migration {name} failed"))
                .with_details(e.to_string())
        })?;

        tx.execute(
            "INSERT INTO _migrations(name, applied_at) VALUES (?1, strftime('%Y-%m-%dT%H:%M:%fZ','now'))",
            [name],
        )
        .map_err(|e| {
            AppError::new("DB_MIGRATION_FAILED", format!("Failed to record migration {name}"))
                .with_details(e.to_string())
        })?;

        tx.commit().map_err(|e| {
            AppError::new("DB_TX_FAILED", "Failed to commit migration transaction")
                .with_details(e.to_string())
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::OptionalExtension;

    #[test]
    fn migrations_create_incidents_table() {
        let mut conn = open_in_memory().expect("open");
        migrate(&mut conn).expect("migrate");

        let name: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type='table' AND name='incidents'",
                [],
                |row| row.get(0),
            )
            .optional()
            .unwrap();
        assert_eq!(name.as_deref(), Some("incidents"));
    }

    #[test]
    fn migrate_twice_is_a_no_op() {
        let mut conn = open_in_memory().expect("open");
        migrate(&mut conn).expect("first migrate");
        migrate(&mut conn).expect("second migrate");

        assert_eq!(
            applied_migrations(&conn).unwrap(),
            vec!["0001_init.sql".to_string()]
        );
    }
}

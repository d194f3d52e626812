use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{Incident, IncidentStatus};
use crate::error::AppError;
use crate::normalize::timestamps::{format_stored_opt, format_stored_ts, parse_stored_opt, parse_stored_ts};

/// Load/save seam between the desk and whatever stores incidents.
///
/// Implementations only see complete records keyed by `code`; the desk never depends on a
/// schema or connection.
pub trait IncidentRepository {
    /// Every stored record, in the order they were first saved.
    fn load_all(&self) -> Result<Vec<Incident>, AppError>;

    /// Insert or replace the record with `incident.code`.
    fn save(&mut self, incident: &Incident) -> Result<(), AppError>;

    /// Physically remove the record with `code`.
    fn delete(&mut self, code: &str) -> Result<(), AppError>;
}

const SELECT_COLUMNS: &str = r#"
      SELECT
        code, status, workstation, description, registered_at,
        resolved_at, resolution_note, deleted_at, deletion_reason
      FROM incidents
"#;

/// Row exactly as stored, before timestamps and status are decoded.
struct StoredRow {
    code: String,
    status: String,
    workstation: i64,
    description: String,
    registered_at: String,
    resolved_at: Option<String>,
    resolution_note: Option<String>,
    deleted_at: Option<String>,
    deletion_reason: Option<String>,
}

impl StoredRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            code: row.get(0)?,
            status: row.get(1)?,
            workstation: row.get(2)?,
            description: row.get(3)?,
            registered_at: row.get(4)?,
            resolved_at: row.get(5)?,
            resolution_note: row.get(6)?,
            deleted_at: row.get(7)?,
            deletion_reason: row.get(8)?,
        })
    }

    fn decode(self) -> Result<Incident, AppError> {
        let status: IncidentStatus = self.status.parse().map_err(|e| {
            AppError::new("DB_DECODE_FAILED", "Failed to decode incident status")
                .with_details(format!("code={}; {e}", self.code))
        })?;

        Ok(Incident {
            status,
            workstation: self.workstation,
            description: self.description,
            registered_at: parse_stored_ts("registered_at", &self.registered_at)?,
            resolved_at: parse_stored_opt("resolved_at", self.resolved_at.as_deref())?,
            resolution_note: self.resolution_note,
            deleted_at: parse_stored_opt("deleted_at", self.deleted_at.as_deref())?,
            deletion_reason: self.deletion_reason,
            code: self.code,
        })
    }
}

pub fn list_incidents(conn: &Connection) -> Result<Vec<Incident>, AppError> {
    let mut stmt = conn
        .prepare(&format!("{SELECT_COLUMNS} ORDER BY rowid ASC"))
        .map_err(|e| {
            AppError::new("DB_QUERY_FAILED", "Failed to prepare incidents query")
                .with_details(e.to_string())
        })?;

    let rows = stmt.query_map([], StoredRow::from_row).map_err(|e| {
        AppError::new("DB_QUERY_FAILED", "Failed to query incidents").with_details(e.to_string())
    })?;

    let mut out = Vec::new();
    for r in rows {
        let row = r.map_err(|e| {
            AppError::new("DB_QUERY_FAILED", "Failed to decode incident row")
                .with_details(e.to_string())
        })?;
        out.push(row.decode()?);
    }

    Ok(out)
}

pub fn count_incidents(conn: &Connection) -> Result<i64, AppError> {
    conn.query_row("SELECT COUNT(*) FROM incidents", [], |row| row.get(0))
        .map_err(|e| {
            AppError::new("DB_QUERY_FAILED", "Failed to count incidents")
                .with_details(e.to_string())
        })
}

pub fn get_incident(conn: &Connection, code: &str) -> Result<Option<Incident>, AppError> {
    let row = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE code = ?1"),
            [code],
            StoredRow::from_row,
        )
        .optional()
        .map_err(|e| {
            AppError::new("DB_QUERY_FAILED", "Failed to query incident")
                .with_details(format!("code={code}; err={e}"))
        })?;

    row.map(StoredRow::decode).transpose()
}

/// Insert or update all nine fields of `incident`, keyed by code. Updating keeps the original
/// rowid, so load order stays registration order.
pub fn upsert_incident(conn: &Connection, incident: &Incident) -> Result<(), AppError> {
    let registered_at = format_stored_ts("registered_at", incident.registered_at)?;
    let resolved_at = format_stored_opt("resolved_at", incident.resolved_at)?;
    let deleted_at = format_stored_opt("deleted_at", incident.deleted_at)?;

    conn.execute(
        r#"
      INSERT INTO incidents(
        code, status, workstation, description, registered_at,
        resolved_at, resolution_note, deleted_at, deletion_reason
      ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
      ON CONFLICT(code) DO UPDATE SET
        status = excluded.status,
        workstation = excluded.workstation,
        description = excluded.description,
        registered_at = excluded.registered_at,
        resolved_at = excluded.resolved_at,
        resolution_note = excluded.resolution_note,
        deleted_at = excluded.deleted_at,
        deletion_reason = excluded.deletion_reason
      "#,
        params![
            incident.code,
            incident.status.as_str(),
            incident.workstation,
            incident.description,
            registered_at,
            resolved_at,
            incident.resolution_note,
            deleted_at,
            incident.deletion_reason,
        ],
    )
    .map_err(|e| {
        AppError::new("DB_WRITE_FAILED", "Failed to save incident")
            .with_details(format!("code={}; err={e}", incident.code))
    })?;

    Ok(())
}

pub fn delete_incident(conn: &Connection, code: &str) -> Result<(), AppError> {
    let changed = conn
        .execute("DELETE FROM incidents WHERE code = ?1", [code])
        .map_err(|e| {
            AppError::new("DB_WRITE_FAILED", "Failed to delete incident")
                .with_details(format!("code={code}; err={e}"))
        })?;

    if changed == 0 {
        return Err(
            AppError::new("DB_NOT_FOUND", "Incident not found").with_details(format!("code={code}"))
        );
    }
    Ok(())
}

/// [`IncidentRepository`] over a migrated SQLite connection.
pub struct SqliteIncidentRepository {
    conn: Connection,
}

impl SqliteIncidentRepository {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

impl IncidentRepository for SqliteIncidentRepository {
    fn load_all(&self) -> Result<Vec<Incident>, AppError> {
        list_incidents(&self.conn)
    }

    fn save(&mut self, incident: &Incident) -> Result<(), AppError> {
        upsert_incident(&self.conn, incident)
    }

    fn delete(&mut self, code: &str) -> Result<(), AppError> {
        delete_incident(&self.conn, code)
    }
}

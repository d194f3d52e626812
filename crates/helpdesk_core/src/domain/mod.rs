use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Lifecycle status of an incident. `Deleted` is a soft delete; the record stays in the desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Pending,
    Resolved,
    Deleted,
}

impl IncidentStatus {
    pub const ALL: [IncidentStatus; 3] = [Self::Pending, Self::Resolved, Self::Deleted];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown incident status {:?} (expected pending, resolved or deleted)",
            self.0
        )
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for IncidentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "resolved" => Ok(Self::Resolved),
            "deleted" => Ok(Self::Deleted),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// A reported problem at a numbered workstation.
///
/// Notes:
/// - `code` is assigned once by the desk and never changes.
/// - `resolved_at`/`resolution_note` are set only while `status == Resolved`.
/// - `deleted_at`/`deletion_reason` are set only while `status == Deleted`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Incident {
    pub code: String,
    pub status: IncidentStatus,
    pub workstation: i64,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub registered_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub resolved_at: Option<OffsetDateTime>,
    pub resolution_note: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub deleted_at: Option<OffsetDateTime>,
    pub deletion_reason: Option<String>,
}

impl Incident {
    pub fn pending(
        code: impl Into<String>,
        workstation: i64,
        description: impl Into<String>,
        registered_at: OffsetDateTime,
    ) -> Self {
        Self {
            code: code.into(),
            status: IncidentStatus::Pending,
            workstation,
            description: description.into(),
            registered_at,
            resolved_at: None,
            resolution_note: None,
            deleted_at: None,
            deletion_reason: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationWarning {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl ValidationWarning {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

use time::OffsetDateTime;

use crate::domain::{Incident, IncidentStatus, ValidationWarning};
use crate::ident::is_well_formed;

fn pairing_check(
    field_ts: &str,
    ts: Option<OffsetDateTime>,
    field_text: &str,
    text: Option<&str>,
    expected: bool,
    status: IncidentStatus,
    warnings: &mut Vec<ValidationWarning>,
) {
    for (field, present) in [(field_ts, ts.is_some()), (field_text, text.is_some())] {
        if present != expected {
            let (code, message) = if expected {
                (
                    "VALIDATION_FIELD_MISSING",
                    format!("{field} is required while status is {status}"),
                )
            } else {
                (
                    "VALIDATION_FIELD_UNEXPECTED",
                    format!("{field} must be empty while status is {status}"),
                )
            };
            warnings.push(ValidationWarning::new(code, message));
        }
    }
}

fn order_check(
    field: &str,
    registered_at: OffsetDateTime,
    later: Option<OffsetDateTime>,
    warnings: &mut Vec<ValidationWarning>,
) {
    let Some(later) = later else { return };
    if later < registered_at {
        warnings.push(
            ValidationWarning::new(
                "VALIDATION_TS_ORDER_VIOLATION",
                format!("Timestamp order violation: registered_at must be <= {field}"),
            )
            .with_details(format!("registered_at={registered_at}; {field}={later}")),
        );
    }
}

/// Check a record that did not come through the desk (e.g. a loaded row) against the
/// lifecycle invariants:
/// - the code matches `DD/MM/YYYY-HH:MM-N`;
/// - resolution fields are present iff resolved, deletion fields iff deleted;
/// - registered_at <= resolved_at and registered_at <= deleted_at (when present).
pub fn validate_incident(incident: &Incident) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if !is_well_formed(&incident.code) {
        warnings.push(
            ValidationWarning::new("VALIDATION_CODE_MALFORMED", "Incident code is malformed")
                .with_details(format!("code={}", incident.code)),
        );
    }

    pairing_check(
        "resolved_at",
        incident.resolved_at,
        "resolution_note",
        incident.resolution_note.as_deref(),
        incident.status == IncidentStatus::Resolved,
        incident.status,
        &mut warnings,
    );
    pairing_check(
        "deleted_at",
        incident.deleted_at,
        "deletion_reason",
        incident.deletion_reason.as_deref(),
        incident.status == IncidentStatus::Deleted,
        incident.status,
        &mut warnings,
    );

    order_check(
        "resolved_at",
        incident.registered_at,
        incident.resolved_at,
        &mut warnings,
    );
    order_check(
        "deleted_at",
        incident.registered_at,
        incident.deleted_at,
        &mut warnings,
    );

    warnings
}

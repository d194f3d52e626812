//! Human-readable and JSON output for desk outcomes.

use helpdesk_core::normalize::timestamps::format_display_ts;
use helpdesk_core::{AppError, Incident, Outcome};

pub fn render_incident(incident: &Incident) -> String {
    let mut out = format!(
        "Code: {}\nStatus: {}\nWorkstation: {}\nDescription: {}\nRegistered: {}\n",
        incident.code,
        incident.status,
        incident.workstation,
        incident.description,
        format_display_ts(incident.registered_at),
    );
    if let Some(ts) = incident.resolved_at {
        out.push_str(&format!("Resolved: {}\n", format_display_ts(ts)));
    }
    if let Some(note) = &incident.resolution_note {
        out.push_str(&format!("Resolution: {note}\n"));
    }
    if let Some(ts) = incident.deleted_at {
        out.push_str(&format!("Deleted: {}\n", format_display_ts(ts)));
    }
    if let Some(reason) = &incident.deletion_reason {
        out.push_str(&format!("Deletion reason: {reason}\n"));
    }
    out
}

pub fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Registered(inc) => {
            format!("Incident registered.\n{}", render_incident(inc))
        }
        Outcome::Found(inc) => render_incident(inc),
        Outcome::Updated(inc) => format!("Incident updated.\n{}", render_incident(inc)),
        Outcome::Listed { status, incidents } if incidents.is_empty() => {
            format!("No {status} incidents.\n")
        }
        Outcome::Listed { incidents, .. } => incidents
            .iter()
            .map(render_incident)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn render_json(outcome: &Outcome) -> Result<String, AppError> {
    serde_json::to_string_pretty(outcome).map_err(|e| {
        AppError::new("OUTPUT_ENCODE_FAILED", "Failed to encode output as JSON")
            .with_details(e.to_string())
    })
}

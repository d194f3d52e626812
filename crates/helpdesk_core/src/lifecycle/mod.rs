use std::collections::HashSet;

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::domain::{Incident, IncidentStatus, ValidationWarning};
use crate::error::LifecycleError;
use crate::ident::{is_well_formed, CodeGenerator};
use crate::validate::validate_incident;

/// Owns the incident collection and is the only place incident fields change.
///
/// State machine:
/// - register creates `Pending`;
/// - `Pending -> Resolved` (resolve), `Resolved -> Pending` (unresolve);
/// - `Pending | Resolved -> Deleted` (delete).
///
/// Edits to workstation/description are refused only while `Resolved`. Resolving a `Deleted`
/// incident is accepted and brings it back as `Resolved`.
#[derive(Debug, Clone, Default)]
pub struct IncidentDesk {
    incidents: Vec<Incident>,
    codes: CodeGenerator,
}

impl IncidentDesk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a desk from stored records, in the order given.
    ///
    /// Records are accepted even when they break an invariant; each problem is returned as a
    /// warning. A repeated code keeps the first record. The code generator resumes after the
    /// latest stored code.
    pub fn from_records(records: Vec<Incident>) -> (Self, Vec<ValidationWarning>) {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();
        let mut incidents = Vec::with_capacity(records.len());

        for record in records {
            if !seen.insert(record.code.clone()) {
                warnings.push(
                    ValidationWarning::new("LOAD_DUPLICATE_CODE", "Duplicate incident code skipped")
                        .with_details(format!("code={}", record.code)),
                );
                continue;
            }
            for w in validate_incident(&record) {
                let details = match w.details.as_deref() {
                    Some(d) => format!("code={}; {d}", record.code),
                    None => format!("code={}", record.code),
                };
                warnings.push(w.with_details(details));
            }
            incidents.push(record);
        }

        for w in &warnings {
            warn!(code = %w.code, details = ?w.details, "{}", w.message);
        }

        let codes = CodeGenerator::resume_from_codes(incidents.iter().map(|i| i.code.as_str()));
        (Self { incidents, codes }, warnings)
    }

    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    pub fn code_generator(&self) -> &CodeGenerator {
        &self.codes
    }

    /// Create a pending incident with a freshly generated code. Always succeeds.
    pub fn register(
        &mut self,
        workstation: i64,
        description: impl Into<String>,
        now: OffsetDateTime,
    ) -> &Incident {
        let mut code = self.codes.next_code(now);
        // A stored record may already hold this code (e.g. clock moved backwards).
        while self.position(&code).is_some() {
            warn!(%code, "generated code already in use; advancing sequence");
            code = self.codes.next_code(now);
        }

        info!(%code, workstation, "incident registered");
        self.incidents
            .push(Incident::pending(code, workstation, description, now));
        &self.incidents[self.incidents.len() - 1]
    }

    pub fn find(&self, code: &str) -> Result<&Incident, LifecycleError> {
        let idx = self.locate(code)?;
        Ok(&self.incidents[idx])
    }

    /// Change workstation and description. Refused only while resolved.
    pub fn edit(
        &mut self,
        code: &str,
        workstation: i64,
        description: impl Into<String>,
    ) -> Result<&Incident, LifecycleError> {
        let incident = self.find_mut(code)?;
        if incident.status == IncidentStatus::Resolved {
            debug!(code, "edit refused: incident is resolved");
            return Err(LifecycleError::InvalidState(incident.code.clone()));
        }

        incident.workstation = workstation;
        incident.description = description.into();
        info!(code, workstation, "incident edited");
        Ok(&*incident)
    }

    /// Soft-delete. Leaving `Resolved` clears the resolution fields.
    pub fn delete(
        &mut self,
        code: &str,
        reason: impl Into<String>,
        now: OffsetDateTime,
    ) -> Result<&Incident, LifecycleError> {
        let incident = self.find_mut(code)?;
        if incident.status == IncidentStatus::Deleted {
            debug!(code, "delete refused: already deleted");
            return Err(LifecycleError::AlreadyDeleted(incident.code.clone()));
        }

        incident.status = IncidentStatus::Deleted;
        incident.deleted_at = Some(now);
        incident.deletion_reason = Some(reason.into());
        incident.resolved_at = None;
        incident.resolution_note = None;
        info!(code, "incident deleted");
        Ok(&*incident)
    }

    /// Mark as resolved. A deleted incident is revived; its deletion fields are cleared.
    pub fn resolve(
        &mut self,
        code: &str,
        resolution_note: impl Into<String>,
        now: OffsetDateTime,
    ) -> Result<&Incident, LifecycleError> {
        let incident = self.find_mut(code)?;
        match incident.status {
            IncidentStatus::Resolved => {
                debug!(code, "resolve refused: already resolved");
                return Err(LifecycleError::AlreadyResolved(incident.code.clone()));
            }
            IncidentStatus::Deleted => {
                warn!(code, "resolving a deleted incident");
                incident.deleted_at = None;
                incident.deletion_reason = None;
            }
            IncidentStatus::Pending => {}
        }

        incident.status = IncidentStatus::Resolved;
        incident.resolved_at = Some(now);
        incident.resolution_note = Some(resolution_note.into());
        info!(code, "incident resolved");
        Ok(&*incident)
    }

    pub fn edit_resolution_note(
        &mut self,
        code: &str,
        resolution_note: impl Into<String>,
    ) -> Result<&Incident, LifecycleError> {
        let incident = self.find_mut(code)?;
        if incident.status != IncidentStatus::Resolved {
            debug!(code, status = %incident.status, "note edit refused: not resolved");
            return Err(LifecycleError::NotResolved(incident.code.clone()));
        }

        incident.resolution_note = Some(resolution_note.into());
        info!(code, "resolution note edited");
        Ok(&*incident)
    }

    /// Return a resolved incident to pending.
    pub fn unresolve(&mut self, code: &str) -> Result<&Incident, LifecycleError> {
        let incident = self.find_mut(code)?;
        if incident.status != IncidentStatus::Resolved {
            debug!(code, status = %incident.status, "unresolve refused: not resolved");
            return Err(LifecycleError::NotResolved(incident.code.clone()));
        }

        incident.status = IncidentStatus::Pending;
        incident.resolved_at = None;
        incident.resolution_note = None;
        info!(code, "incident returned to pending");
        Ok(&*incident)
    }

    /// Incidents in `status`, in registration order.
    pub fn list_by_status(&self, status: IncidentStatus) -> Vec<&Incident> {
        self.incidents
            .iter()
            .filter(|i| i.status == status)
            .collect()
    }

    fn position(&self, code: &str) -> Option<usize> {
        self.incidents.iter().position(|i| i.code == code)
    }

    fn locate(&self, code: &str) -> Result<usize, LifecycleError> {
        if !is_well_formed(code) {
            return Err(LifecycleError::InvalidFormat(code.to_string()));
        }
        self.position(code)
            .ok_or_else(|| LifecycleError::NotFound(code.to_string()))
    }

    fn find_mut(&mut self, code: &str) -> Result<&mut Incident, LifecycleError> {
        let idx = self.locate(code)?;
        Ok(&mut self.incidents[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use time::macros::datetime;

    #[test]
    fn registered_incident_starts_pending() {
        let mut desk = IncidentDesk::new();
        let inc = desk
            .register(5, "printer jam", datetime!(2024-03-05 09:07 UTC))
            .clone();
        assert_eq!(
            inc,
            Incident::pending(
                "05/03/2024-09:07-1",
                5,
                "printer jam",
                datetime!(2024-03-05 09:07 UTC)
            )
        );
        assert_eq!(desk.find(&inc.code), Ok(&inc));
    }

    #[test]
    fn invalid_format_wins_over_not_found() {
        let desk = IncidentDesk::new();
        assert_eq!(
            desk.find("5/3/2024-9:07-1"),
            Err(LifecycleError::InvalidFormat("5/3/2024-9:07-1".into()))
        );
        assert_eq!(
            desk.find("05/03/2024-09:07-1"),
            Err(LifecycleError::NotFound("05/03/2024-09:07-1".into()))
        );
    }

    #[test]
    fn edit_is_allowed_on_deleted_incidents() {
        let mut desk = IncidentDesk::new();
        let now = datetime!(2024-03-05 09:07 UTC);
        let code = desk.register(1, "no network", now).code.clone();
        desk.delete(&code, "duplicate", now).unwrap();

        let inc = desk.edit(&code, 2, "no network on port 3").unwrap();
        assert_eq!(inc.status, IncidentStatus::Deleted);
        assert_eq!(inc.workstation, 2);
    }

    #[test]
    fn deleting_a_resolved_incident_clears_resolution() {
        let mut desk = IncidentDesk::new();
        let now = datetime!(2024-03-05 09:07 UTC);
        let code = desk.register(1, "no network", now).code.clone();
        desk.resolve(&code, "cable replaced", now).unwrap();

        let inc = desk.delete(&code, "wrong station", now).unwrap();
        assert_eq!(inc.status, IncidentStatus::Deleted);
        assert_eq!(inc.resolved_at, None);
        assert_eq!(inc.resolution_note, None);
        assert!(validate_incident(inc).is_empty());
    }

    #[test]
    fn resolving_a_deleted_incident_revives_it() {
        let mut desk = IncidentDesk::new();
        let t0 = datetime!(2024-03-05 09:07 UTC);
        let t1 = datetime!(2024-03-05 11:30 UTC);
        let code = desk.register(7, "keyboard", t0).code.clone();
        desk.delete(&code, "duplicate", t0).unwrap();

        let inc = desk.resolve(&code, "keys cleaned", t1).unwrap();
        assert_eq!(inc.status, IncidentStatus::Resolved);
        assert_eq!(inc.resolved_at, Some(t1));
        assert_eq!(inc.deleted_at, None);
        assert_eq!(inc.deletion_reason, None);
    }

    #[test]
    fn note_edit_requires_resolved() {
        let mut desk = IncidentDesk::new();
        let now = datetime!(2024-03-05 09:07 UTC);
        let code = desk.register(3, "mouse", now).code.clone();

        assert_eq!(
            desk.edit_resolution_note(&code, "n/a"),
            Err(LifecycleError::NotResolved(code.clone()))
        );
        desk.resolve(&code, "batteries", now).unwrap();
        let inc = desk.edit_resolution_note(&code, "new batteries").unwrap();
        assert_eq!(inc.resolution_note.as_deref(), Some("new batteries"));
        assert_eq!(inc.resolved_at, Some(now));
    }

    #[test]
    fn seeding_skips_duplicates_and_resumes_counter() {
        let t = datetime!(2024-03-05 09:07 UTC);
        let records = vec![
            Incident::pending("05/03/2024-09:07-1", 1, "a", t),
            Incident::pending("05/03/2024-09:07-2", 2, "b", t),
            Incident::pending("05/03/2024-09:07-1", 3, "c", t),
        ];
        let (mut desk, warnings) = IncidentDesk::from_records(records);

        assert_eq!(desk.len(), 2);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, "LOAD_DUPLICATE_CODE");
        assert_eq!(desk.find("05/03/2024-09:07-1").unwrap().workstation, 1);

        let next = desk.register(4, "d", t).code.clone();
        assert_eq!(next, "05/03/2024-09:07-3");
    }

    #[test]
    fn saturated_stored_sequence_does_not_break_registration() {
        let t = datetime!(2024-03-05 09:07 UTC);
        let (mut desk, _) = IncidentDesk::from_records(vec![Incident::pending(
            "05/03/2024-09:07-4294967295",
            1,
            "a",
            t,
        )]);

        let code = desk.register(2, "b", t).code.clone();
        assert_eq!(code, "05/03/2024-09:07-1");
        assert_eq!(desk.len(), 2);
    }

    #[test]
    fn register_skips_codes_already_in_the_collection() {
        let (mut desk, _) = IncidentDesk::from_records(vec![
            Incident::pending("05/03/2024-09:07-1", 1, "a", datetime!(2024-03-05 09:07 UTC)),
            Incident::pending("06/03/2024-08:00-1", 2, "b", datetime!(2024-03-06 08:00 UTC)),
        ]);
        // Clock went back a day: the sequence restarts and would reuse the first code.
        let code = desk.register(3, "c", datetime!(2024-03-05 09:07 UTC)).code.clone();
        assert_eq!(code, "05/03/2024-09:07-2");
        assert_eq!(desk.len(), 3);
    }
}

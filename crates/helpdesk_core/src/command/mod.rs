use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::{Incident, IncidentStatus};
use crate::error::LifecycleError;
use crate::lifecycle::IncidentDesk;

/// One request against the desk, independent of where it came from (CLI, shell, tests).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Register {
        workstation: i64,
        description: String,
    },
    Find {
        code: String,
    },
    Edit {
        code: String,
        workstation: i64,
        description: String,
    },
    Delete {
        code: String,
        reason: String,
    },
    Resolve {
        code: String,
        note: String,
    },
    EditResolutionNote {
        code: String,
        note: String,
    },
    Unresolve {
        code: String,
    },
    List {
        status: IncidentStatus,
    },
}

impl Command {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Find { .. } | Self::List { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum Outcome {
    Registered(Incident),
    Found(Incident),
    Updated(Incident),
    Listed {
        status: IncidentStatus,
        incidents: Vec<Incident>,
    },
}

impl Outcome {
    /// The record a mutating command changed, if any.
    pub fn changed(&self) -> Option<&Incident> {
        match self {
            Self::Registered(inc) | Self::Updated(inc) => Some(inc),
            Self::Found(_) | Self::Listed { .. } => None,
        }
    }
}

pub fn dispatch(
    desk: &mut IncidentDesk,
    command: Command,
    now: OffsetDateTime,
) -> Result<Outcome, LifecycleError> {
    let outcome = match command {
        Command::Register {
            workstation,
            description,
        } => Outcome::Registered(desk.register(workstation, description, now).clone()),
        Command::Find { code } => Outcome::Found(desk.find(&code)?.clone()),
        Command::Edit {
            code,
            workstation,
            description,
        } => Outcome::Updated(desk.edit(&code, workstation, description)?.clone()),
        Command::Delete { code, reason } => {
            Outcome::Updated(desk.delete(&code, reason, now)?.clone())
        }
        Command::Resolve { code, note } => {
            Outcome::Updated(desk.resolve(&code, note, now)?.clone())
        }
        Command::EditResolutionNote { code, note } => {
            Outcome::Updated(desk.edit_resolution_note(&code, note)?.clone())
        }
        Command::Unresolve { code } => Outcome::Updated(desk.unresolve(&code)?.clone()),
        Command::List { status } => Outcome::Listed {
            status,
            incidents: desk.list_by_status(status).into_iter().cloned().collect(),
        },
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn dispatch_routes_each_command() {
        let mut desk = IncidentDesk::new();
        let now = datetime!(2024-03-05 09:07 UTC);

        let registered = dispatch(
            &mut desk,
            Command::Register {
                workstation: 12,
                description: "no sound".into(),
            },
            now,
        )
        .unwrap();
        let code = registered.changed().unwrap().code.clone();

        let resolved = dispatch(
            &mut desk,
            Command::Resolve {
                code: code.clone(),
                note: "driver reinstalled".into(),
            },
            now,
        )
        .unwrap();
        assert_eq!(
            resolved.changed().map(|i| i.status),
            Some(IncidentStatus::Resolved)
        );

        let listed = dispatch(
            &mut desk,
            Command::List {
                status: IncidentStatus::Resolved,
            },
            now,
        )
        .unwrap();
        assert!(matches!(
            listed,
            Outcome::Listed { ref incidents, .. } if incidents.len() == 1 && incidents[0].code == code
        ));
        assert_eq!(listed.changed(), None);
    }

    #[test]
    fn failures_pass_through_unchanged() {
        let mut desk = IncidentDesk::new();
        let err = dispatch(
            &mut desk,
            Command::Unresolve {
                code: "nope".into(),
            },
            datetime!(2024-03-05 09:07 UTC),
        )
        .unwrap_err();
        assert_eq!(err, LifecycleError::InvalidFormat("nope".into()));
    }

    #[test]
    fn only_reads_are_not_mutations() {
        assert!(!Command::Find { code: String::new() }.is_mutation());
        assert!(!Command::List {
            status: IncidentStatus::Pending
        }
        .is_mutation());
        assert!(Command::Unresolve { code: String::new() }.is_mutation());
    }
}

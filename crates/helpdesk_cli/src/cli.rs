//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use helpdesk_core::{Command, IncidentStatus};

/// Record and follow up incidents reported at numbered workstations.
#[derive(Parser, Debug)]
#[command(name = "helpdesk", version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "HELPDESK_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite file holding the incidents (overrides the configuration file)
    #[arg(long, global = true, env = "HELPDESK_DB")]
    pub db: Option<PathBuf>,

    /// Keep everything in memory; nothing is written to disk
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Register a new pending incident
    Register {
        #[arg(long, short)]
        workstation: i64,
        #[arg(long, short)]
        description: String,
    },

    /// Show one incident
    Find { code: String },

    /// Change workstation and description (not allowed once resolved)
    Edit {
        code: String,
        #[arg(long, short)]
        workstation: i64,
        #[arg(long, short)]
        description: String,
    },

    /// Soft-delete an incident
    Delete {
        code: String,
        #[arg(long, short)]
        reason: String,
    },

    /// Mark an incident as resolved
    Resolve {
        code: String,
        #[arg(long, short)]
        note: String,
    },

    /// Replace the resolution note of a resolved incident
    EditNote {
        code: String,
        #[arg(long, short)]
        note: String,
    },

    /// Return a resolved incident to pending
    Unresolve { code: String },

    /// List incidents by status
    List {
        #[arg(long, short, default_value = "pending")]
        status: IncidentStatus,
    },

    /// Interactive numbered menu
    Shell,
}

impl Commands {
    /// The desk command this subcommand maps to; `None` for `shell`.
    pub fn into_command(self) -> Option<Command> {
        let command = match self {
            Self::Register {
                workstation,
                description,
            } => Command::Register {
                workstation,
                description,
            },
            Self::Find { code } => Command::Find { code },
            Self::Edit {
                code,
                workstation,
                description,
            } => Command::Edit {
                code,
                workstation,
                description,
            },
            Self::Delete { code, reason } => Command::Delete { code, reason },
            Self::Resolve { code, note } => Command::Resolve { code, note },
            Self::EditNote { code, note } => Command::EditResolutionNote { code, note },
            Self::Unresolve { code } => Command::Unresolve { code },
            Self::List { status } => Command::List { status },
            Self::Shell => return None,
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_defaults_to_pending() {
        let cli = Cli::try_parse_from(["helpdesk", "list"]).unwrap();
        assert_eq!(
            cli.command.into_command(),
            Some(Command::List {
                status: IncidentStatus::Pending
            })
        );
    }

    #[test]
    fn edit_note_maps_to_resolution_note_command() {
        let cli = Cli::try_parse_from([
            "helpdesk",
            "--ephemeral",
            "edit-note",
            "05/03/2024-09:07-1",
            "--note",
            "fan replaced",
        ])
        .unwrap();
        assert!(cli.ephemeral);
        assert_eq!(
            cli.command.into_command(),
            Some(Command::EditResolutionNote {
                code: "05/03/2024-09:07-1".into(),
                note: "fan replaced".into()
            })
        );
    }

    #[test]
    fn unknown_status_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["helpdesk", "list", "--status", "archived"]).is_err());
    }

    #[test]
    fn shell_has_no_desk_command() {
        let cli = Cli::try_parse_from(["helpdesk", "shell"]).unwrap();
        assert_eq!(cli.command.into_command(), None);
    }
}

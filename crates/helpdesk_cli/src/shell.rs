//! Interactive numbered menu over any line-oriented input and output.

use std::io::{BufRead, Write};

use helpdesk_core::{
    AppError, Clock, Command, IncidentRepository, IncidentStatus, Outcome, Session, SessionError,
};

use crate::render::render_outcome;

const MENU: &str = "\
*******************************
SELECT AN OPTION
*******************************
1. Register incident
2. Find incident
3. Modify incident
4. Delete incident
5. Resolve incident
6. Modify resolved incident
7. Return resolved incident to pending
8. Show pending incidents
9. Show resolved incidents
10. Show deleted incidents
11. Exit
";

const EXIT_OPTION: u8 = 11;

fn io_error(e: std::io::Error) -> AppError {
    AppError::new("SHELL_IO_FAILED", "Failed to talk to the terminal").with_details(e.to_string())
}

pub struct Shell<I, O> {
    input: I,
    out: O,
}

impl<I: BufRead, O: Write> Shell<I, O> {
    pub fn new(input: I, out: O) -> Self {
        Self { input, out }
    }

    pub fn into_output(self) -> O {
        self.out
    }

    /// Run the menu until the operator exits or input ends.
    pub fn run<R, C>(&mut self, session: &mut Session<R, C>) -> Result<(), AppError>
    where
        R: IncidentRepository,
        C: Clock,
    {
        self.say("*******************************\nINCIDENT DESK\n*******************************\n")?;
        loop {
            self.say(MENU)?;
            let Some(line) = self.read_line()? else {
                return Ok(());
            };
            let choice = match line.trim().parse::<u8>() {
                Ok(n) if (1..=EXIT_OPTION).contains(&n) => n,
                _ => {
                    self.say(&format!("Please enter a number from 1 to {EXIT_OPTION}.\n"))?;
                    continue;
                }
            };
            if choice == EXIT_OPTION {
                self.say("Goodbye.\n")?;
                return Ok(());
            }

            let Some(command) = self.ask_command(choice)? else {
                // Cancelled by the operator or input ended mid-prompt.
                continue;
            };
            let result = session.execute(command);
            self.report(result)?;
        }
    }

    fn ask_command(&mut self, choice: u8) -> Result<Option<Command>, AppError> {
        let command = match choice {
            1 => {
                let Some(workstation) = self.ask_workstation("Workstation number:")? else {
                    return Ok(None);
                };
                let Some(description) = self.ask("Describe the problem:")? else {
                    return Ok(None);
                };
                Command::Register {
                    workstation,
                    description,
                }
            }
            2 => {
                let Some(code) = self.ask("Code of the incident to find:")? else {
                    return Ok(None);
                };
                Command::Find { code }
            }
            3 => {
                let Some(code) = self.ask("Code of the incident to modify (or 's' to cancel):")?
                else {
                    return Ok(None);
                };
                if code.eq_ignore_ascii_case("s") {
                    return Ok(None);
                }
                let Some(workstation) = self.ask_workstation("New workstation number:")? else {
                    return Ok(None);
                };
                let Some(description) = self.ask("New problem description:")? else {
                    return Ok(None);
                };
                Command::Edit {
                    code,
                    workstation,
                    description,
                }
            }
            4 => {
                let Some(code) = self.ask("Code of the incident to delete:")? else {
                    return Ok(None);
                };
                let Some(reason) = self.ask("Reason for deletion:")? else {
                    return Ok(None);
                };
                Command::Delete { code, reason }
            }
            5 => {
                let Some(code) = self.ask("Code of the incident to resolve:")? else {
                    return Ok(None);
                };
                let Some(note) = self.ask("Describe the resolution:")? else {
                    return Ok(None);
                };
                Command::Resolve { code, note }
            }
            6 => {
                let Some(code) = self.ask("Code of the resolved incident to modify:")? else {
                    return Ok(None);
                };
                let Some(note) = self.ask("New resolution description:")? else {
                    return Ok(None);
                };
                Command::EditResolutionNote { code, note }
            }
            7 => {
                let Some(code) = self.ask("Code of the resolved incident to return:")? else {
                    return Ok(None);
                };
                Command::Unresolve { code }
            }
            8 => Command::List {
                status: IncidentStatus::Pending,
            },
            9 => Command::List {
                status: IncidentStatus::Resolved,
            },
            _ => Command::List {
                status: IncidentStatus::Deleted,
            },
        };
        Ok(Some(command))
    }

    fn report(&mut self, result: Result<Outcome, SessionError>) -> Result<(), AppError> {
        match result {
            Ok(outcome) => self.say(&render_outcome(&outcome)),
            Err(SessionError::Storage(e)) => {
                self.say(&format!("error: {e} (the change is kept for this session)\n"))
            }
            Err(SessionError::Lifecycle(e)) => self.say(&format!("error: {e}\n")),
        }
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>, AppError> {
        self.say(prompt)?;
        self.say("\n")?;
        Ok(self.read_line()?.map(|l| l.trim().to_string()))
    }

    fn ask_workstation(&mut self, prompt: &str) -> Result<Option<i64>, AppError> {
        loop {
            let Some(answer) = self.ask(prompt)? else {
                return Ok(None);
            };
            match answer.parse::<i64>() {
                Ok(n) => return Ok(Some(n)),
                Err(_) => self.say("Invalid number; digits only.\n")?,
            }
        }
    }

    fn read_line(&mut self) -> Result<Option<String>, AppError> {
        let mut line = String::new();
        let n = self.input.read_line(&mut line).map_err(io_error)?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn say(&mut self, text: &str) -> Result<(), AppError> {
        self.out.write_all(text.as_bytes()).map_err(io_error)?;
        self.out.flush().map_err(io_error)
    }
}

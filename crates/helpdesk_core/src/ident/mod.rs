use once_cell::sync::Lazy;
use regex::Regex;
use time::{Date, Month, OffsetDateTime};
use tracing::warn;

// ASCII digits only; `\d` would also accept other Unicode digit classes.
static CODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}-[0-9]{2}:[0-9]{2}-[0-9]+$")
        .expect("incident code pattern is a valid regex")
});

/// Lexical check for `DD/MM/YYYY-HH:MM-N`. Does not check that the date exists.
pub fn is_well_formed(code: &str) -> bool {
    CODE_PATTERN.is_match(code)
}

/// Calendar date and per-day sequence encoded in a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CodeParts {
    pub date: Date,
    pub sequence: u32,
}

/// Split a well-formed code into its date and sequence.
///
/// Returns `None` for malformed codes, impossible dates (`31/02/2024`) and sequences that do not
/// fit in a `u32`.
pub fn parse_code(code: &str) -> Option<CodeParts> {
    if !is_well_formed(code) {
        return None;
    }
    let day: u8 = code[0..2].parse().ok()?;
    let month: u8 = code[3..5].parse().ok()?;
    let year: i32 = code[6..10].parse().ok()?;
    let sequence: u32 = code[17..].parse().ok()?;

    let month = Month::try_from(month).ok()?;
    let date = Date::from_calendar_date(year, month, day).ok()?;
    Some(CodeParts { date, sequence })
}

/// Produces incident codes: registration minute plus a sequence that restarts every calendar day.
///
/// The counter lives in memory only. [`CodeGenerator::resume`] lets a desk seeded from storage
/// continue the sequence of the last stored day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeGenerator {
    last_registration_date: Option<Date>,
    daily_counter: u32,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self {
            last_registration_date: None,
            daily_counter: 1,
        }
    }

    pub fn resume(date: Date, daily_counter: u32) -> Self {
        Self {
            last_registration_date: Some(date),
            daily_counter,
        }
    }

    /// Resume from the latest `(date, sequence)` among the given codes. Malformed codes and codes
    /// whose sequence leaves no room for a successor are ignored.
    pub fn resume_from_codes<'a>(codes: impl IntoIterator<Item = &'a str>) -> Self {
        codes
            .into_iter()
            .filter_map(parse_code)
            .filter(|parts| {
                let usable = parts.sequence < u32::MAX;
                if !usable {
                    warn!(
                        date = %parts.date,
                        sequence = parts.sequence,
                        "stored sequence is saturated; not resuming from it"
                    );
                }
                usable
            })
            .max()
            .map(|latest| Self::resume(latest.date, latest.sequence))
            .unwrap_or_default()
    }

    pub fn last_registration_date(&self) -> Option<Date> {
        self.last_registration_date
    }

    pub fn daily_counter(&self) -> u32 {
        self.daily_counter
    }

    /// Advance the counter for `now` and return the new code. Every call consumes a number.
    pub fn next_code(&mut self, now: OffsetDateTime) -> String {
        let today = now.date();
        if self.last_registration_date == Some(today) {
            self.daily_counter = match self.daily_counter.checked_add(1) {
                Some(next) => next,
                None => {
                    warn!(date = %today, "daily sequence exhausted; restarting at 1");
                    1
                }
            };
        } else {
            self.last_registration_date = Some(today);
            self.daily_counter = 1;
        }

        format!(
            "{:02}/{:02}/{:04}-{:02}:{:02}-{}",
            now.day(),
            u8::from(now.month()),
            now.year(),
            now.hour(),
            now.minute(),
            self.daily_counter
        )
    }
}

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::error::AppError;

/// Canonical storage form: RFC3339 with the offset the timestamp was recorded in.
pub fn format_stored_ts(field: &str, ts: OffsetDateTime) -> Result<String, AppError> {
    ts.format(&Rfc3339).map_err(|e| {
        AppError::new("DB_ENCODE_FAILED", format!("Failed to encode {field}"))
            .with_details(format!("value={ts}; err={e}"))
    })
}

pub fn format_stored_opt(field: &str, ts: Option<OffsetDateTime>) -> Result<Option<String>, AppError> {
    ts.map(|ts| format_stored_ts(field, ts)).transpose()
}

/// Parse a stored timestamp.
///
/// RFC3339 is the canonical form. A bare `YYYY-MM-DD HH:MM:SS` (what SQL tools tend to write by
/// hand) is accepted and taken as UTC.
pub fn parse_stored_ts(field: &str, raw: &str) -> Result<OffsetDateTime, AppError> {
    let trimmed = raw.trim();
    if let Ok(dt) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(dt);
    }

    let fallback = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    PrimitiveDateTime::parse(trimmed, fallback)
        .map(|pdt| pdt.assume_offset(UtcOffset::UTC))
        .map_err(|e| {
            AppError::new("DB_DECODE_FAILED", format!("Unparseable timestamp for {field}"))
                .with_details(format!("raw={trimmed}; err={e}"))
        })
}

pub fn parse_stored_opt(field: &str, raw: Option<&str>) -> Result<Option<OffsetDateTime>, AppError> {
    raw.map(|raw| parse_stored_ts(field, raw)).transpose()
}

/// Operator-facing form, the same minute precision used in incident codes: `DD/MM/YYYY-HH:MM`.
pub fn format_display_ts(ts: OffsetDateTime) -> String {
    format!(
        "{:02}/{:02}/{:04}-{:02}:{:02}",
        ts.day(),
        u8::from(ts.month()),
        ts.year(),
        ts.hour(),
        ts.minute()
    )
}

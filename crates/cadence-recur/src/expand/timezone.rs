//! Timezone resolution and UTC conversion for facility wall-clock times.
//!
//! Uses ICU4X for Windows timezone ID to IANA mapping and timezone canonicalization.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;
use std::str::FromStr;

/// Error during timezone conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// Unknown or invalid timezone identifier.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Non-existent time during DST gap.
    #[error("Non-existent time (DST gap): {0}")]
    NonExistentTime(String),
}

/// ## Summary
/// Resolves a timezone identifier to a `chrono_tz::Tz`.
///
/// Facilities store whatever identifier their admins typed, so Windows
/// names and vendor prefixes are normalized before lookup.
///
/// ## Errors
/// Returns `ConversionError::UnknownTimezone` if the identifier cannot be resolved.
pub fn resolve_timezone(tzid: &str) -> Result<Tz, ConversionError> {
    let normalized = normalize_tzid(tzid);
    let tz = Tz::from_str(&normalized)
        .map_err(|_e| ConversionError::UnknownTimezone(tzid.to_string()))?;
    tracing::trace!(tzid, resolved = %tz, "Resolved timezone");
    Ok(tz)
}

/// Normalizes common timezone identifiers to IANA names.
///
/// Uses ICU4X for Windows timezone ID mapping and IANA canonicalization.
fn normalize_tzid(tzid: &str) -> String {
    let trimmed = tzid.trim();
    let stripped = trimmed
        .strip_prefix("/mozilla.org/")
        .or_else(|| trimmed.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(trimmed);

    let iana = IanaParserExtended::new();
    let windows_zone = WindowsParser::new().parse(stripped, None);
    if let Some(entry) =
        windows_zone.and_then(|zone| iana.iter().find(|entry| entry.time_zone == zone))
    {
        return entry.canonical.to_string();
    }

    // Europe/Kiev -> Europe/Kyiv
    let parsed = iana.parse(stripped);
    if parsed.time_zone == icu::time::TimeZone::UNKNOWN {
        stripped.to_string()
    } else {
        parsed.canonical.to_string()
    }
}

/// ## Summary
/// Converts a facility wall-clock datetime to UTC.
///
/// Ambiguous times (DST fold) resolve to the first occurrence.
///
/// ## Errors
///
/// Returns `ConversionError::NonExistentTime` if the wall-clock time falls in a DST gap.
pub fn convert_to_utc(
    local_time: NaiveDateTime,
    tz: Tz,
) -> Result<DateTime<Utc>, ConversionError> {
    match tz.from_local_datetime(&local_time) {
        LocalResult::None => Err(ConversionError::NonExistentTime(format!(
            "{local_time} in timezone {tz}"
        ))),
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(dt1, _dt2) => Ok(dt1.with_timezone(&Utc)),
    }
}

/// ## Summary
/// Converts a facility wall-clock datetime to UTC, shifting DST-gap times
/// forward by one hour instead of failing.
///
/// ## Errors
///
/// Returns an error only if the shifted time is also non-existent.
pub fn convert_to_utc_lenient(
    local_time: NaiveDateTime,
    tz: Tz,
) -> Result<DateTime<Utc>, ConversionError> {
    match convert_to_utc(local_time, tz) {
        Ok(dt) => Ok(dt),
        Err(ConversionError::NonExistentTime(_)) => {
            let shifted = local_time + chrono::Duration::hours(1);
            convert_to_utc(shifted, tz)
        }
        Err(err) => Err(err),
    }
}

/// ## Summary
/// Converts a UTC instant to facility wall-clock time.
#[must_use]
pub fn utc_to_local(instant: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    instant.with_timezone(&tz).naive_local()
}

/// ## Summary
/// Returns the calendar date at the facility for a given instant.
///
/// Attendance cut-offs use this rather than the UTC date, which is already
/// "tomorrow" for US facilities every evening.
#[must_use]
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

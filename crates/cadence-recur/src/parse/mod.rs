//! Reader for the persisted `DTSTART`/`RRULE` text form of a rule.
//!
//! The accepted grammar is the RFC 5545 subset the schedule model can
//! express: `FREQ` of `DAILY`, `WEEKLY` or `MONTHLY`, plus `INTERVAL`,
//! `BYDAY` (plain weekdays only), `COUNT`, `UNTIL` and `WKST=MO`.

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use chrono_tz::Tz;

use crate::error::{RecurError, RecurResult};
use crate::expand::timezone::{resolve_timezone, utc_to_local};
use crate::rule::{Frequency, RecurrenceRule, RuleSpec};

const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";
const DATE_FORMAT: &str = "%Y%m%d";

/// Placeholder zone meaning "the facility's own timezone".
pub const LOCAL_TZID: &str = "Local";

/// ## Summary
/// Parses a two-line rule text into a validated [`RecurrenceRule`].
///
/// `DTSTART` may be UTC (`Z` suffix), floating, `TZID=Local`, or carry an
/// explicit `TZID`. Whatever its form, it is converted to wall-clock time in
/// `facility_tz`, which is what every occurrence is scheduled in.
///
/// ## Errors
/// Returns `RecurError::InvalidRule` for missing or repeated lines, unknown
/// or repeated rule parts, malformed values, and any rule that fails
/// validation. Returns `RecurError::Timezone` for an unknown `TZID`.
#[tracing::instrument(skip(text), fields(len = text.len()))]
pub fn parse_rule(text: &str, facility_tz: Tz) -> RecurResult<RecurrenceRule> {
    let mut dt_start = None;
    let mut rrule = None;

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| invalid(format!("line has no value: {line}")))?;
        let (property, params) = match name.split_once(';') {
            Some((property, params)) => (property, Some(params)),
            None => (name, None),
        };

        match property.to_ascii_uppercase().as_str() {
            "DTSTART" => {
                if dt_start.is_some() {
                    return Err(invalid("DTSTART appears more than once"));
                }
                dt_start = Some(parse_dt_start(params, value, facility_tz)?);
            }
            "RRULE" => {
                if params.is_some() {
                    return Err(invalid("RRULE does not take parameters"));
                }
                if rrule.is_some() {
                    return Err(invalid("RRULE appears more than once"));
                }
                rrule = Some(value);
            }
            other => return Err(invalid(format!("unsupported property {other}"))),
        }
    }

    let start = dt_start.ok_or_else(|| invalid("missing DTSTART"))?;
    let parts = rrule.ok_or_else(|| invalid("missing RRULE"))?;
    let spec = parse_rrule_parts(parts, start, facility_tz)?;

    tracing::trace!(frequency = %spec.frequency, %start, "Parsed recurrence rule");
    RecurrenceRule::new(spec)
}

fn parse_dt_start(
    params: Option<&str>,
    value: &str,
    facility_tz: Tz,
) -> RecurResult<NaiveDateTime> {
    let tzid = match params {
        None => None,
        Some(params) => {
            let (key, tzid) = params
                .split_once('=')
                .ok_or_else(|| invalid(format!("malformed DTSTART parameter {params}")))?;
            if !key.eq_ignore_ascii_case("TZID") {
                return Err(invalid(format!("unsupported DTSTART parameter {key}")));
            }
            Some(tzid)
        }
    };

    if let Some(utc) = value.strip_suffix('Z') {
        if tzid.is_some() {
            return Err(invalid("DTSTART cannot combine TZID with a UTC time"));
        }
        let instant = parse_date_time(utc)?.and_utc();
        return Ok(utc_to_local(instant, facility_tz));
    }

    let wall_clock = parse_date_time(value)?;
    match tzid {
        None => Ok(wall_clock),
        Some(tzid) if tzid == LOCAL_TZID => Ok(wall_clock),
        Some(tzid) => {
            let source = resolve_timezone(tzid)?;
            if source == facility_tz {
                return Ok(wall_clock);
            }
            let instant = crate::expand::timezone::convert_to_utc_lenient(wall_clock, source)?;
            Ok(utc_to_local(instant, facility_tz))
        }
    }
}

fn parse_rrule_parts(parts: &str, start: NaiveDateTime, facility_tz: Tz) -> RecurResult<RuleSpec> {
    let mut frequency = None;
    let mut interval = None;
    let mut by_weekday = None;
    let mut count = None;
    let mut until = None;
    let mut week_start = false;

    for part in parts.split(';').filter(|part| !part.is_empty()) {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| invalid(format!("rule part has no value: {part}")))?;
        let key = key.to_ascii_uppercase();
        let duplicate = match key.as_str() {
            "FREQ" => frequency
                .replace(
                    Frequency::parse(&value.to_ascii_uppercase())
                        .ok_or_else(|| invalid(format!("unsupported FREQ {value}")))?,
                )
                .is_some(),
            "INTERVAL" => interval.replace(parse_number::<u16>("INTERVAL", value)?).is_some(),
            "BYDAY" => by_weekday.replace(parse_weekdays(value)?).is_some(),
            "COUNT" => count.replace(parse_number::<u32>("COUNT", value)?).is_some(),
            "UNTIL" => until
                .replace(parse_until(value, start, facility_tz)?)
                .is_some(),
            "WKST" => {
                if !value.eq_ignore_ascii_case("MO") {
                    return Err(invalid(format!("unsupported WKST {value}")));
                }
                std::mem::replace(&mut week_start, true)
            }
            other => return Err(invalid(format!("unsupported rule part {other}"))),
        };
        if duplicate {
            return Err(invalid(format!("rule part {key} appears more than once")));
        }
    }

    Ok(RuleSpec {
        frequency: frequency.ok_or_else(|| invalid("RRULE is missing FREQ"))?,
        interval: interval.unwrap_or(1),
        by_weekday: by_weekday.unwrap_or_default(),
        start,
        count,
        until,
    })
}

fn parse_date_time(value: &str) -> RecurResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT)
        .map_err(|e| invalid(format!("malformed date-time {value}: {e}")))
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> RecurResult<T> {
    value
        .parse::<T>()
        .map_err(|_e| invalid(format!("{key} must be a non-negative integer, got {value}")))
}

fn parse_weekdays(value: &str) -> RecurResult<Vec<Weekday>> {
    value
        .split(',')
        .map(|token| match token.trim().to_ascii_uppercase().as_str() {
            "MO" => Ok(Weekday::Mon),
            "TU" => Ok(Weekday::Tue),
            "WE" => Ok(Weekday::Wed),
            "TH" => Ok(Weekday::Thu),
            "FR" => Ok(Weekday::Fri),
            "SA" => Ok(Weekday::Sat),
            "SU" => Ok(Weekday::Sun),
            other => Err(invalid(format!("unsupported BYDAY value {other}"))),
        })
        .collect()
}

/// `UNTIL` is kept as the last facility-local date an occurrence may fall
/// on. A bound earlier in the day than the rule's start time excludes that
/// day. UTC timestamps are moved into the facility zone first.
fn parse_until(value: &str, start: NaiveDateTime, facility_tz: Tz) -> RecurResult<NaiveDate> {
    let bound = if let Some(utc) = value.strip_suffix('Z') {
        utc_to_local(parse_date_time(utc)?.and_utc(), facility_tz)
    } else if value.contains('T') {
        parse_date_time(value)?
    } else {
        return NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map_err(|e| invalid(format!("malformed UNTIL {value}: {e}")));
    };

    if bound.time() < start.time() {
        bound
            .date()
            .pred_opt()
            .ok_or_else(|| invalid(format!("UNTIL {value} is out of range")))
    } else {
        Ok(bound.date())
    }
}

fn invalid(message: impl Into<String>) -> RecurError {
    RecurError::InvalidRule(message.into())
}

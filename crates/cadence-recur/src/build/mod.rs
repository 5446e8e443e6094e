//! Writer for the persisted rule text.

use std::fmt::Write;

use chrono::Weekday;

use crate::parse::LOCAL_TZID;
use crate::rule::RecurrenceRule;

/// ## Summary
/// Serializes a rule to its `DTSTART`/`RRULE` text form.
///
/// The start is written as facility wall-clock time under `TZID=Local`, so
/// the text stays correct if the facility later changes its timezone.
/// [`crate::parse::parse_rule`] reads the output back to an equal rule.
#[must_use]
pub fn serialize_rule(rule: &RecurrenceRule) -> String {
    let mut out = format!(
        "DTSTART;TZID={LOCAL_TZID}:{}\nRRULE:FREQ={};INTERVAL={}",
        rule.start().format("%Y%m%dT%H%M%S"),
        rule.frequency(),
        rule.interval()
    );

    if !rule.by_weekday().is_empty() {
        let days: Vec<&str> = rule.by_weekday().iter().map(|day| weekday_code(*day)).collect();
        let _ = write!(out, ";BYDAY={}", days.join(","));
    }
    if let Some(count) = rule.count() {
        let _ = write!(out, ";COUNT={count}");
    }
    if let Some(until) = rule.until() {
        let _ = write!(out, ";UNTIL={}", until.format("%Y%m%d"));
    }
    out
}

const fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

//! Validated recurrence rule model.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use rrule::{NWeekday, RRule, RRuleSet};
use serde::{Deserialize, Serialize};

use crate::error::{RecurError, RecurResult};
use crate::expand::timezone::convert_to_utc_lenient;

/// Repetition frequency supported by the structured grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Returns the `FREQ=` token for this frequency.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
        }
    }

    /// Parses a `FREQ=` token.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "DAILY" => Some(Self::Daily),
            "WEEKLY" => Some(Self::Weekly),
            "MONTHLY" => Some(Self::Monthly),
            _ => None,
        }
    }

    const fn to_rrule(self) -> rrule::Frequency {
        match self {
            Self::Daily => rrule::Frequency::Daily,
            Self::Weekly => rrule::Frequency::Weekly,
            Self::Monthly => rrule::Frequency::Monthly,
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unvalidated rule fields as they arrive from a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval: u16,
    #[serde(default)]
    pub by_weekday: Vec<Weekday>,
    /// Facility wall-clock start of the first occurrence.
    pub start: NaiveDateTime,
    #[serde(default)]
    pub count: Option<u32>,
    /// Last date (inclusive) on which the rule may produce an occurrence.
    #[serde(default)]
    pub until: Option<NaiveDate>,
}

const fn default_interval() -> u16 {
    1
}

/// A recurrence rule that has passed validation.
///
/// Fields are private so a constructed rule always satisfies the frequency,
/// weekday and bound constraints checked in [`RecurrenceRule::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleSpec", into = "RuleSpec")]
pub struct RecurrenceRule {
    frequency: Frequency,
    interval: u16,
    by_weekday: Vec<Weekday>,
    start: NaiveDateTime,
    count: Option<u32>,
    until: Option<NaiveDate>,
}

impl RecurrenceRule {
    /// ## Summary
    /// Validates a rule specification and builds a rule from it.
    ///
    /// Weekdays are de-duplicated and ordered Monday first.
    ///
    /// ## Errors
    /// Returns `RecurError::InvalidRule` if:
    /// - the interval is zero
    /// - a weekly rule has no weekdays
    /// - a monthly rule lists weekdays
    /// - the count is zero
    /// - the until date precedes the start date
    ///
    /// Also returns `RecurError::InvalidRule` if the RFC 5545 validator
    /// rejects the equivalent rule.
    pub fn new(spec: RuleSpec) -> RecurResult<Self> {
        let mut by_weekday = spec.by_weekday;
        by_weekday.sort_by_key(Weekday::num_days_from_monday);
        by_weekday.dedup();

        let rule = Self {
            frequency: spec.frequency,
            interval: spec.interval,
            by_weekday,
            start: spec.start,
            count: spec.count,
            until: spec.until,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// ## Summary
    /// Checks the structural invariants of the rule.
    ///
    /// ## Errors
    /// See [`RecurrenceRule::new`].
    pub fn validate(&self) -> RecurResult<()> {
        if self.interval == 0 {
            return Err(RecurError::InvalidRule(
                "interval must be at least 1".to_string(),
            ));
        }
        match self.frequency {
            Frequency::Weekly if self.by_weekday.is_empty() => {
                return Err(RecurError::InvalidRule(
                    "weekly rules require at least one weekday".to_string(),
                ));
            }
            Frequency::Monthly if !self.by_weekday.is_empty() => {
                return Err(RecurError::InvalidRule(
                    "monthly rules cannot be restricted by weekday".to_string(),
                ));
            }
            _ => {}
        }
        if self.count == Some(0) {
            return Err(RecurError::InvalidRule(
                "count must be at least 1".to_string(),
            ));
        }
        if let Some(until) = self.until
            && until < self.start.date()
        {
            return Err(RecurError::InvalidRule(format!(
                "until date {until} precedes start date {}",
                self.start.date()
            )));
        }

        // Cross-check against the RFC 5545 validator. UTC avoids spurious
        // failures for starts that sit in a DST gap of the facility zone.
        self.to_rrule_set(chrono_tz::UTC)?;
        Ok(())
    }

    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        self.frequency
    }

    #[must_use]
    pub const fn interval(&self) -> u16 {
        self.interval
    }

    /// Weekdays in Monday-first order.
    #[must_use]
    pub fn by_weekday(&self) -> &[Weekday] {
        &self.by_weekday
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Wall-clock time every occurrence starts at unless overridden.
    #[must_use]
    pub fn start_time(&self) -> NaiveTime {
        self.start.time()
    }

    #[must_use]
    pub const fn count(&self) -> Option<u32> {
        self.count
    }

    #[must_use]
    pub const fn until(&self) -> Option<NaiveDate> {
        self.until
    }

    /// ## Summary
    /// Builds the equivalent `rrule` set anchored in the given timezone.
    ///
    /// When both a count and an until date are present only the count is
    /// handed to `rrule` (RFC 5545 forbids both); the expander applies the
    /// until date itself.
    ///
    /// ## Errors
    /// Returns `RecurError::InvalidRule` if `rrule` rejects the rule,
    /// or `RecurError::Timezone` if the start cannot be placed in `tz`.
    pub fn to_rrule_set(&self, tz: chrono_tz::Tz) -> RecurResult<RRuleSet> {
        let rrule_tz = rrule::Tz::Tz(tz);
        let dt_start = to_rrule_datetime(self.start, tz, &rrule_tz)?;

        let mut rule = RRule::new(self.frequency.to_rrule()).interval(self.interval);
        if !self.by_weekday.is_empty() {
            rule = rule.by_weekday(
                self.by_weekday
                    .iter()
                    .map(|day| NWeekday::Every(*day))
                    .collect(),
            );
        }
        if let Some(count) = self.count {
            rule = rule.count(count);
        } else if let Some(until) = self.until {
            // UNTIL must be UTC when DTSTART carries a zone.
            let end_of_day =
                until.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN));
            rule = rule.until(to_rrule_datetime(end_of_day, tz, &rrule::Tz::UTC)?);
        }

        let validated = rule
            .validate(dt_start)
            .map_err(|err| RecurError::InvalidRule(err.to_string()))?;
        Ok(RRuleSet::new(dt_start).rrule(validated))
    }
}

fn to_rrule_datetime(
    local: NaiveDateTime,
    tz: chrono_tz::Tz,
    rrule_tz: &rrule::Tz,
) -> RecurResult<DateTime<rrule::Tz>> {
    Ok(convert_to_utc_lenient(local, tz)?.with_timezone(rrule_tz))
}

impl TryFrom<RuleSpec> for RecurrenceRule {
    type Error = RecurError;

    fn try_from(spec: RuleSpec) -> Result<Self, Self::Error> {
        Self::new(spec)
    }
}

impl From<RecurrenceRule> for RuleSpec {
    fn from(rule: RecurrenceRule) -> Self {
        Self {
            frequency: rule.frequency,
            interval: rule.interval,
            by_weekday: rule.by_weekday,
            start: rule.start,
            count: rule.count,
            until: rule.until,
        }
    }
}

impl std::fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&crate::build::serialize_rule(self))
    }
}

//! Merges candidate dates with an event's override history.
//!
//! Precedence for a date `d`:
//! 1. the most recent single-occurrence override on `d`
//! 2. the latest forward override effective on or before `d`
//! 3. the event's own values
//!
//! Single-occurrence substitutions are layered over the forward baseline,
//! so fields they leave unset keep the forward value.

use std::collections::HashMap;

use cadence_db::db::enums::OverrideScope;
use cadence_db::model::schedule::{Override, OverrideKind, ScheduledEvent, Substitution};
use cadence_recur::expand::timezone::convert_to_utc_lenient;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ServiceResult;

/// One resolved date of an event. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Occurrence {
    pub event_id: Uuid,
    pub class_id: Uuid,
    /// Calendar-day key; a rescheduled occurrence keeps its original date.
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub room: String,
    pub duration_minutes: u32,
    pub is_cancelled: bool,
}

impl Occurrence {
    /// ## Summary
    /// Absolute start of the occurrence in the facility timezone.
    ///
    /// Starts inside a DST gap move forward by an hour; ambiguous starts take
    /// the earlier instant.
    ///
    /// ## Errors
    /// Returns `ServiceError::InvalidInput` if no instant exists for the start.
    pub fn start_instant(&self, tz: Tz) -> ServiceResult<DateTime<Utc>> {
        let local = self.date.and_time(self.start_time);
        Ok(convert_to_utc_lenient(local, tz).map_err(cadence_recur::error::RecurError::from)?)
    }

    /// ## Summary
    /// Absolute end of the occurrence.
    ///
    /// ## Errors
    /// See [`Occurrence::start_instant`].
    pub fn end_instant(&self, tz: Tz) -> ServiceResult<DateTime<Utc>> {
        Ok(self.start_instant(tz)? + Duration::minutes(i64::from(self.duration_minutes)))
    }

    /// Wall-clock end time; wraps past midnight.
    #[must_use]
    pub fn end_time(&self) -> NaiveTime {
        self.start_time + Duration::minutes(i64::from(self.duration_minutes))
    }

    /// `HH:MM-HH:MM` label shown next to the date.
    #[must_use]
    pub fn class_time(&self) -> String {
        format!(
            "{}-{}",
            self.start_time.format(cadence_core::constants::TIME_FORMAT),
            self.end_time().format(cadence_core::constants::TIME_FORMAT)
        )
    }
}

/// Overrides of one event, indexed for lookup by date.
struct OverrideIndex<'a> {
    singles: HashMap<NaiveDate, &'a Override>,
    /// Ascending by effective date, then recency.
    forwards: Vec<&'a Override>,
}

impl<'a> OverrideIndex<'a> {
    fn new(event_id: Uuid, overrides: &'a [Override]) -> Self {
        let mut singles: HashMap<NaiveDate, &Override> = HashMap::new();
        let mut forwards = Vec::new();

        for entry in overrides.iter().filter(|entry| entry.event_id == event_id) {
            match entry.scope {
                OverrideScope::SingleOccurrence => {
                    singles
                        .entry(entry.effective_date)
                        .and_modify(|current| {
                            if recency(entry) > recency(current) {
                                *current = entry;
                            }
                        })
                        .or_insert(entry);
                }
                OverrideScope::Forward => forwards.push(entry),
            }
        }
        forwards.sort_by_key(|entry| (entry.effective_date, recency(entry)));

        Self { singles, forwards }
    }

    fn forward_for(&self, date: NaiveDate) -> Option<&'a Override> {
        let end = self
            .forwards
            .partition_point(|entry| entry.effective_date <= date);
        end.checked_sub(1).map(|index| self.forwards[index])
    }
}

fn recency(entry: &Override) -> (DateTime<Utc>, Uuid) {
    (entry.created_at, entry.id)
}

/// ## Summary
/// Resolves every candidate date, keeping cancelled dates flagged.
///
/// Output is ordered by date and is a pure function of its inputs.
#[must_use]
pub fn resolve_all(
    event: &ScheduledEvent,
    dates: impl IntoIterator<Item = NaiveDate>,
    overrides: &[Override],
) -> Vec<Occurrence> {
    let index = OverrideIndex::new(event.id, overrides);

    let mut occurrences: Vec<Occurrence> = dates
        .into_iter()
        .map(|date| {
            let forward = index.forward_for(date).map(|entry| &entry.kind);
            let (baseline, forward_cancelled) = match forward {
                Some(OverrideKind::Rescheduled(substitution)) => (substitution.clone(), false),
                Some(OverrideKind::Cancelled) => (Substitution::default(), true),
                None => (Substitution::default(), false),
            };
            let single = index.singles.get(&date).map(|entry| &entry.kind);
            let (effective, is_cancelled) = match single {
                Some(OverrideKind::Cancelled) => (baseline, true),
                Some(OverrideKind::Rescheduled(substitution)) => {
                    (substitution.over(&baseline), false)
                }
                None => (baseline, forward_cancelled),
            };

            Occurrence {
                event_id: event.id,
                class_id: event.class_id,
                date,
                start_time: effective.start_time.unwrap_or_else(|| event.rule.start_time()),
                room: effective.room.unwrap_or_else(|| event.room.clone()),
                duration_minutes: effective.duration_minutes.unwrap_or(event.duration_minutes),
                is_cancelled,
            }
        })
        .collect();

    occurrences.sort_by_key(|occurrence| occurrence.date);
    occurrences.dedup_by_key(|occurrence| occurrence.date);
    tracing::trace!(event_id = %event.id, count = occurrences.len(), "Resolved occurrences");
    occurrences
}

/// ## Summary
/// Resolves candidate dates to live occurrences only.
#[must_use]
pub fn resolve(
    event: &ScheduledEvent,
    dates: impl IntoIterator<Item = NaiveDate>,
    overrides: &[Override],
) -> Vec<Occurrence> {
    resolve_all(event, dates, overrides)
        .into_iter()
        .filter(|occurrence| !occurrence.is_cancelled)
        .collect()
}

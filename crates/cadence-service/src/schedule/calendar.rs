//! Day-bucketed calendars across every event visible to a requester.

use std::collections::HashMap;

use cadence_core::config::ScheduleConfig;
use cadence_db::db::{CalendarScope, ScheduleGateway};
use cadence_db::model::schedule::{Override, ScheduledEvent};
use cadence_recur::{DateWindow, expand};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing_futures::Instrument;
use uuid::Uuid;

use crate::context::{check_window, facility_timezone};
use crate::error::ServiceResult;
use crate::schedule::resolver::{Occurrence, resolve, resolve_all};

/// Ordering of occurrences within one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOrder {
    #[default]
    ByStartTime,
    ByRoom,
}

/// Presentation choices made per request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ViewOptions {
    #[serde(default)]
    pub order: DayOrder,
    /// Keep cancelled occurrences, flagged, instead of dropping them.
    #[serde(default)]
    pub include_cancelled: bool,
}

/// Everything the pure assembly step needs besides the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarConfig {
    pub timezone: Tz,
    pub view: ViewOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Day {
    pub date: NaiveDate,
    pub occurrences: Vec<Occurrence>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Calendar {
    pub window: DateWindow,
    /// IANA name of the zone the days are bucketed in.
    pub timezone: String,
    /// One entry per date of the window, empty days included.
    pub days: Vec<Day>,
}

impl Calendar {
    /// Iterates over every occurrence in date order.
    pub fn occurrences(&self) -> impl Iterator<Item = &Occurrence> {
        self.days.iter().flat_map(|day| day.occurrences.iter())
    }
}

/// ## Summary
/// Expands and resolves each event over the window and buckets the results
/// by facility-local date.
///
/// `overrides` is keyed by event id; events without an entry have none.
#[must_use]
pub fn assemble_calendar(
    events: &[ScheduledEvent],
    overrides: &HashMap<Uuid, Vec<Override>>,
    window: DateWindow,
    config: &CalendarConfig,
) -> Calendar {
    let mut days: Vec<Day> = window
        .days()
        .map(|date| Day {
            date,
            occurrences: Vec::new(),
        })
        .collect();

    for event in events {
        let history = overrides.get(&event.id).map_or(&[][..], Vec::as_slice);
        let dates = expand(&event.rule, window);
        let occurrences = if config.view.include_cancelled {
            resolve_all(event, dates, history)
        } else {
            resolve(event, dates, history)
        };

        for occurrence in occurrences {
            let offset = (occurrence.date - window.start()).num_days();
            if let Some(day) = usize::try_from(offset).ok().and_then(|index| days.get_mut(index)) {
                day.occurrences.push(occurrence);
            }
        }
    }

    for day in &mut days {
        match config.view.order {
            DayOrder::ByStartTime => day.occurrences.sort_by(|a, b| {
                (a.start_time, &a.room, a.event_id).cmp(&(b.start_time, &b.room, b.event_id))
            }),
            DayOrder::ByRoom => day.occurrences.sort_by(|a, b| {
                (&a.room, a.start_time, a.event_id).cmp(&(&b.room, b.start_time, b.event_id))
            }),
        }
    }

    Calendar {
        window,
        timezone: config.timezone.name().to_string(),
        days,
    }
}

/// ## Summary
/// Builds the calendar for one scope over a window.
///
/// Override histories of the scope's events are fetched concurrently.
///
/// ## Errors
/// Returns `ServiceError::InvalidRange` if the window exceeds the configured
/// maximum, before any gateway call. Returns `ServiceError::NotFound` for an
/// unknown facility and `ServiceError::DatabaseUnavailable` on gateway failure.
#[tracing::instrument(
    skip(gateway, settings),
    fields(start = %window.start(), end = %window.end())
)]
pub async fn build_calendar(
    gateway: &dyn ScheduleGateway,
    scope: CalendarScope,
    window: DateWindow,
    view: ViewOptions,
    settings: &ScheduleConfig,
) -> ServiceResult<Calendar> {
    check_window(window, settings)?;

    let facility = gateway.get_facility(scope.facility_id()).await?;
    let timezone = facility_timezone(&facility, settings)?;
    let events = gateway.get_scheduled_events_for_scope(scope).await?;

    let histories = futures::future::try_join_all(
        events
            .iter()
            .map(|event| gateway.get_overrides_for_event(event.id)),
    )
    .await?;
    let overrides: HashMap<Uuid, Vec<Override>> = events
        .iter()
        .map(|event| event.id)
        .zip(histories)
        .collect();

    let config = CalendarConfig { timezone, view };
    let calendar = assemble_calendar(&events, &overrides, window, &config);
    tracing::debug!(
        events = events.len(),
        occurrences = calendar.occurrences().count(),
        "Calendar built"
    );
    Ok(calendar)
}

/// ## Summary
/// Builds calendars for several scopes concurrently.
///
/// Each build runs in its own span; the builds share nothing.
///
/// ## Errors
/// Fails with the first error any scope produces.
pub async fn build_calendars(
    gateway: &dyn ScheduleGateway,
    scopes: &[CalendarScope],
    window: DateWindow,
    view: ViewOptions,
    settings: &ScheduleConfig,
) -> ServiceResult<Vec<Calendar>> {
    futures::future::try_join_all(scopes.iter().map(|scope| {
        build_calendar(gateway, *scope, window, view, settings)
            .instrument(tracing::info_span!("calendar_scope", scope = ?scope))
    }))
    .await
}

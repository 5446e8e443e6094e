//! Per-request scheduling context.

use cadence_core::config::ScheduleConfig;
use cadence_db::db::ScheduleGateway;
use cadence_db::model::facility::Facility;
use cadence_db::model::schedule::ScheduledEvent;
use cadence_recur::DateWindow;
use cadence_recur::expand::timezone::{local_date, resolve_timezone};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};

/// Facility timezone and the facility-local "today" a request runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleContext {
    pub timezone: Tz,
    pub today: NaiveDate,
}

impl ScheduleContext {
    /// Context for the current instant.
    #[must_use]
    pub fn now(timezone: Tz) -> Self {
        Self::at_instant(timezone, Utc::now())
    }

    /// Context whose "today" is the facility-local date of `instant`.
    #[must_use]
    pub fn at_instant(timezone: Tz, instant: DateTime<Utc>) -> Self {
        Self {
            timezone,
            today: local_date(instant, timezone),
        }
    }

    /// Context pinned to a given local date.
    #[must_use]
    pub const fn at(timezone: Tz, today: NaiveDate) -> Self {
        Self { timezone, today }
    }
}

/// ## Summary
/// Resolves a facility's timezone, falling back to the configured default
/// when the facility has none.
///
/// ## Errors
/// Returns `ServiceError::InvalidInput` if the identifier is unknown.
pub fn facility_timezone(facility: &Facility, settings: &ScheduleConfig) -> ServiceResult<Tz> {
    let tzid = if facility.timezone.trim().is_empty() {
        settings.default_timezone.as_str()
    } else {
        facility.timezone.as_str()
    };
    resolve_timezone(tzid).map_err(|e| {
        tracing::warn!(facility_id = %facility.id, tzid, "Facility timezone is not resolvable");
        ServiceError::InvalidInput(e.to_string())
    })
}

/// ## Summary
/// Context of the configured default timezone, for requests that span
/// several facilities.
///
/// ## Errors
/// Returns `ServiceError::InvalidInput` if the default identifier is unknown.
pub fn default_context(
    settings: &ScheduleConfig,
    instant: DateTime<Utc>,
) -> ServiceResult<ScheduleContext> {
    let timezone = resolve_timezone(&settings.default_timezone)
        .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;
    Ok(ScheduleContext::at_instant(timezone, instant))
}

/// ## Summary
/// Loads a facility and returns its context at `instant`.
///
/// ## Errors
/// Returns `ServiceError::NotFound` for an unknown facility,
/// `ServiceError::InvalidInput` for an unresolvable timezone and
/// `ServiceError::DatabaseUnavailable` on gateway failure.
#[tracing::instrument(skip(gateway, settings))]
pub async fn load_facility_context(
    gateway: &dyn ScheduleGateway,
    facility_id: Uuid,
    settings: &ScheduleConfig,
    instant: DateTime<Utc>,
) -> ServiceResult<ScheduleContext> {
    let facility = gateway.get_facility(facility_id).await?;
    let timezone = facility_timezone(&facility, settings)?;
    Ok(ScheduleContext::at_instant(timezone, instant))
}

/// ## Summary
/// Rejects windows longer than `schedule.max_window_days`, so no query
/// materializes an unbounded rule.
///
/// ## Errors
/// Returns `ServiceError::InvalidRange` when the window is too long.
pub fn check_window(window: DateWindow, settings: &ScheduleConfig) -> ServiceResult<()> {
    if window.num_days() > i64::from(settings.max_window_days) {
        return Err(ServiceError::InvalidRange(format!(
            "window of {} days exceeds the maximum of {}",
            window.num_days(),
            settings.max_window_days
        )));
    }
    Ok(())
}

/// A live event together with its facility's timezone.
#[derive(Debug, Clone)]
pub struct EventContext {
    pub event: ScheduledEvent,
    pub timezone: Tz,
}

/// ## Summary
/// Loads an event and the timezone of the facility that owns it.
///
/// ## Errors
/// Returns `ServiceError::NotFound` if the event or its class is missing,
/// `ServiceError::DatabaseUnavailable` on gateway failure.
#[tracing::instrument(skip(gateway, settings))]
pub async fn load_event_context(
    gateway: &dyn ScheduleGateway,
    event_id: Uuid,
    settings: &ScheduleConfig,
) -> ServiceResult<EventContext> {
    let event = gateway.get_event(event_id).await?;
    let facility = gateway.get_facility_for_class(event.class_id).await?;
    let timezone = facility_timezone(&facility, settings)?;
    Ok(EventContext { event, timezone })
}

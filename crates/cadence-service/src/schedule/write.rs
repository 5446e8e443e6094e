//! Schedule writes: new events and appended overrides.

use cadence_core::config::ScheduleConfig;
use cadence_db::db::ScheduleGateway;
use cadence_db::db::enums::OverrideScope;
use cadence_db::error::DbError;
use cadence_db::model::schedule::{
    NewOverride, NewScheduledEvent, Override, OverrideKind, ScheduledEvent,
};
use cadence_recur::parse::parse_rule;
use cadence_recur::{DateWindow, RecurrenceRule, RuleSpec, expand};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::context::facility_timezone;
use crate::error::{ServiceError, ServiceResult};

/// Body of an event creation request. Exactly one of `rule` and `rrule`
/// must be given.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEventRequest {
    #[serde(default)]
    pub rule: Option<RuleSpec>,
    /// `DTSTART`/`RRULE` text form.
    #[serde(default)]
    pub rrule: Option<String>,
    pub room: String,
    pub duration_minutes: u32,
}

/// Body of an override request.
#[derive(Debug, Clone, Deserialize)]
pub struct OverrideRequest {
    pub effective_date: NaiveDate,
    #[serde(flatten)]
    pub kind: OverrideKind,
    pub scope: OverrideScope,
    #[serde(default)]
    pub reason: Option<String>,
}

/// ## Summary
/// Creates a scheduled event for a class.
///
/// A structured rule, the room and the duration are validated before any
/// gateway call. A text rule needs the facility timezone, so it is parsed
/// after the class's facility is loaded.
///
/// ## Errors
/// Returns `ServiceError::InvalidInput` for an empty room, a zero duration or
/// a missing/duplicated rule, `ServiceError::InvalidRule` for a rule that
/// fails validation, and `ServiceError::NotFound` for an unknown class.
#[tracing::instrument(skip(gateway, request, settings))]
pub async fn create_event(
    gateway: &dyn ScheduleGateway,
    class_id: Uuid,
    request: NewEventRequest,
    settings: &ScheduleConfig,
) -> ServiceResult<ScheduledEvent> {
    let room = request.room.trim().to_string();
    if room.is_empty() {
        return Err(ServiceError::InvalidInput("room must not be empty".to_string()));
    }
    if request.duration_minutes == 0 {
        return Err(ServiceError::InvalidInput(
            "duration_minutes must be positive".to_string(),
        ));
    }

    let rule = match (request.rule, request.rrule) {
        (Some(spec), None) => RecurrenceRule::new(spec)?,
        (None, Some(text)) => {
            let facility = gateway.get_facility_for_class(class_id).await?;
            parse_rule(&text, facility_timezone(&facility, settings)?)?
        }
        _ => {
            return Err(ServiceError::InvalidInput(
                "exactly one of rule and rrule is required".to_string(),
            ));
        }
    };

    let event = gateway
        .create_event(NewScheduledEvent {
            class_id,
            rule,
            room,
            duration_minutes: request.duration_minutes,
        })
        .await?;
    tracing::info!(event_id = %event.id, rule = %event.rule, "Scheduled event created");
    Ok(event)
}

/// ## Summary
/// Appends an override to an event's history.
///
/// ## Errors
/// - `ServiceError::InvalidInput` for an empty or invalid substitution, or a
///   forward override before the rule start
/// - `ServiceError::OccurrenceNotFound` if a single-occurrence override
///   targets a date the rule never produces
/// - `ServiceError::OverrideConflict` if the event already has a forward
///   override on that date
/// - `ServiceError::NotFound` for an unknown event
#[tracing::instrument(
    skip(gateway, request),
    fields(date = %request.effective_date, scope = %request.scope)
)]
pub async fn create_override(
    gateway: &dyn ScheduleGateway,
    event_id: Uuid,
    request: OverrideRequest,
) -> ServiceResult<Override> {
    if let OverrideKind::Rescheduled(substitution) = &request.kind {
        if substitution.is_empty() {
            return Err(ServiceError::InvalidInput(
                "a reschedule must change the start time, room or duration".to_string(),
            ));
        }
        if substitution.duration_minutes == Some(0) {
            return Err(ServiceError::InvalidInput(
                "duration_minutes must be positive".to_string(),
            ));
        }
        if substitution.room.as_deref().is_some_and(|room| room.trim().is_empty()) {
            return Err(ServiceError::InvalidInput("room must not be empty".to_string()));
        }
    }

    let event = gateway.get_event(event_id).await?;
    let date = request.effective_date;
    match request.scope {
        OverrideScope::SingleOccurrence => {
            let produced = expand(&event.rule, DateWindow::single_day(date)).next().is_some();
            if !produced {
                return Err(ServiceError::OccurrenceNotFound { event_id, date });
            }
        }
        OverrideScope::Forward => {
            if date < event.rule.start_date() {
                return Err(ServiceError::InvalidInput(format!(
                    "forward override on {date} precedes the schedule start {}",
                    event.rule.start_date()
                )));
            }
            let existing = gateway.get_overrides_for_event(event_id).await?;
            if existing
                .iter()
                .any(|entry| entry.scope == OverrideScope::Forward && entry.effective_date == date)
            {
                tracing::warn!(%event_id, %date, "Rejected duplicate forward override");
                return Err(ServiceError::OverrideConflict { event_id, date });
            }
        }
    }

    let stored = gateway
        .create_override(NewOverride {
            event_id,
            effective_date: date,
            kind: request.kind,
            scope: request.scope,
            reason: request.reason,
        })
        .await
        .map_err(|err| match err {
            // Lost a race with a concurrent writer.
            DbError::Conflict(_) => ServiceError::OverrideConflict { event_id, date },
            other => other.into(),
        })?;
    tracing::info!(override_id = %stored.id, "Override recorded");
    Ok(stored)
}

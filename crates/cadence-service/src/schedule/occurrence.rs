//! Per-event occurrence queries.

use std::collections::HashMap;

use cadence_core::config::ScheduleConfig;
use cadence_db::db::ScheduleGateway;
use cadence_db::model::attendance::AttendanceRecord;
use cadence_recur::{DateWindow, expand};
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::context::check_window;
use crate::error::ServiceResult;
use crate::pagination::{Page, Paginated};
use crate::schedule::resolver::{Occurrence, resolve, resolve_all};

/// A live occurrence date with its time label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDate {
    pub date: NaiveDate,
    pub class_time: String,
}

/// A resolved instance and the attendance recorded for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventInstance {
    #[serde(flatten)]
    pub occurrence: Occurrence,
    pub class_time: String,
    pub attendance: Vec<AttendanceRecord>,
}

/// ## Summary
/// Lists the live occurrence dates of one event inside a window.
///
/// ## Errors
/// Returns `ServiceError::InvalidRange` for a window past the configured
/// maximum, `ServiceError::NotFound` for an unknown or deleted event and
/// `ServiceError::DatabaseUnavailable` on gateway failure.
#[tracing::instrument(skip(gateway, settings))]
pub async fn event_occurrence_dates(
    gateway: &dyn ScheduleGateway,
    event_id: Uuid,
    window: DateWindow,
    settings: &ScheduleConfig,
) -> ServiceResult<Vec<EventDate>> {
    check_window(window, settings)?;
    let event = gateway.get_event(event_id).await?;
    let overrides = gateway.get_overrides_for_event(event_id).await?;

    Ok(resolve(&event, expand(&event.rule, window), &overrides)
        .into_iter()
        .map(|occurrence| EventDate {
            date: occurrence.date,
            class_time: occurrence.class_time(),
        })
        .collect())
}

/// ## Summary
/// Lists every resolved instance of one event in a window, cancelled ones
/// flagged, each with its attendance records. Newest first, paginated.
///
/// ## Errors
/// Returns `ServiceError::InvalidRange` for a window past the configured
/// maximum, `ServiceError::NotFound` for an unknown or deleted event and
/// `ServiceError::DatabaseUnavailable` on gateway failure.
#[tracing::instrument(skip(gateway, settings))]
pub async fn event_instances_with_attendance(
    gateway: &dyn ScheduleGateway,
    event_id: Uuid,
    window: DateWindow,
    page: Page,
    settings: &ScheduleConfig,
) -> ServiceResult<Paginated<EventInstance>> {
    check_window(window, settings)?;
    let event = gateway.get_event(event_id).await?;
    let (overrides, records) = futures::future::try_join(
        gateway.get_overrides_for_event(event_id),
        gateway.get_attendance_for_event(event_id, window),
    )
    .await?;

    let mut by_date: HashMap<NaiveDate, Vec<AttendanceRecord>> = HashMap::new();
    for record in records {
        by_date.entry(record.date).or_default().push(record);
    }

    let mut instances: Vec<EventInstance> =
        resolve_all(&event, expand(&event.rule, window), &overrides)
            .into_iter()
            .map(|occurrence| EventInstance {
                class_time: occurrence.class_time(),
                attendance: by_date.remove(&occurrence.date).unwrap_or_default(),
                occurrence,
            })
            .collect();
    instances.reverse();

    Ok(page.apply(instances))
}

//! Attendance logging, removal, listing and rates, checked against the
//! resolved schedule.

use std::collections::HashMap;

use cadence_db::db::enums::AttendanceStatus;
use cadence_db::db::{ScheduleGateway, UpsertOutcome};
use cadence_db::model::attendance::{AttendanceRecord, AttendanceUpsert};
use cadence_db::model::schedule::ScheduledEvent;
use cadence_recur::{DateWindow, expand};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attendance::tracking::{apply_time_tracking, parse_clock};
use crate::context::ScheduleContext;
use crate::error::{ServiceError, ServiceResult};
use crate::pagination::{Page, Paginated};
use crate::schedule::resolver::resolve;

/// Body of an attendance log request.
#[derive(Debug, Clone, Deserialize)]
pub struct LogAttendance {
    pub user_id: Uuid,
    pub date: NaiveDate,
    /// Derived from the times when omitted.
    #[serde(default)]
    pub status: Option<AttendanceStatus>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub check_in_at: Option<String>,
    #[serde(default)]
    pub check_out_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggedAttendance {
    pub record: AttendanceRecord,
    pub outcome: UpsertOutcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct AttendanceFilter {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<AttendanceStatus>,
}

/// An attendance record joined with the user's display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceEntry {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub name_first: Option<String>,
    pub name_last: Option<String>,
    pub doc_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttendanceRate {
    pub date: NaiveDate,
    pub enrolled: u32,
    pub attended: u32,
    /// Percentage in `[0, 100]`.
    pub attendance_rate: f64,
}

/// ## Summary
/// Records attendance for one user at one occurrence of `event`.
///
/// Every check runs before the single upsert, so a rejected request leaves
/// nothing behind. Re-logging the same values reports `Unchanged`.
///
/// ## Errors
/// - `ServiceError::InvalidInput` for malformed times, a date after the
///   facility-local today, a user not enrolled in the class, or
///   inconsistent time tracking
/// - `ServiceError::OccurrenceNotFound` if `date` is not a live occurrence
/// - `ServiceError::DatabaseUnavailable` on gateway failure
#[tracing::instrument(
    skip(gateway, event, context, request),
    fields(event_id = %event.id, user_id = %request.user_id, date = %request.date)
)]
pub async fn log_attendance(
    gateway: &dyn ScheduleGateway,
    event: &ScheduledEvent,
    context: &ScheduleContext,
    request: LogAttendance,
) -> ServiceResult<LoggedAttendance> {
    let check_in_at = parse_clock("check_in_at", request.check_in_at.as_deref())?;
    let check_out_at = parse_clock("check_out_at", request.check_out_at.as_deref())?;

    if request.date > context.today {
        return Err(ServiceError::InvalidInput(format!(
            "cannot record attendance for {}, which is after today ({})",
            request.date, context.today
        )));
    }

    if !gateway.is_enrolled(event.class_id, request.user_id).await? {
        return Err(ServiceError::InvalidInput(format!(
            "user {} is not enrolled in class {}",
            request.user_id, event.class_id
        )));
    }

    let overrides = gateway.get_overrides_for_event(event.id).await?;
    let candidates = expand(&event.rule, DateWindow::single_day(request.date));
    let Some(occurrence) = resolve(event, candidates, &overrides).into_iter().next() else {
        tracing::warn!("Rejected attendance for a date without a live occurrence");
        return Err(ServiceError::OccurrenceNotFound {
            event_id: event.id,
            date: request.date,
        });
    };

    let tracked = apply_time_tracking(
        request.status,
        check_in_at,
        check_out_at,
        occurrence.duration_minutes,
    )?;

    let (record, outcome) = gateway
        .upsert_attendance(AttendanceUpsert {
            event_id: event.id,
            user_id: request.user_id,
            date: request.date,
            status: tracked.status,
            note: request.note.filter(|note| !note.trim().is_empty()),
            check_in_at: tracked.check_in_at,
            check_out_at: tracked.check_out_at,
            minutes_attended: tracked.minutes_attended,
            scheduled_minutes: Some(tracked.scheduled_minutes),
        })
        .await?;

    tracing::info!(status = %record.status, ?outcome, "Attendance logged");
    Ok(LoggedAttendance { record, outcome })
}

/// ## Summary
/// Removes a user's attendance for one date. Deleting a missing record is
/// not an error.
///
/// ## Errors
/// Returns `ServiceError::DatabaseUnavailable` on gateway failure.
#[tracing::instrument(skip(gateway))]
pub async fn delete_attendance(
    gateway: &dyn ScheduleGateway,
    event_id: Uuid,
    user_id: Uuid,
    date: NaiveDate,
) -> ServiceResult<bool> {
    let removed = gateway.delete_attendance(event_id, user_id, date).await?;
    if removed {
        tracing::info!("Attendance deleted");
    } else {
        tracing::debug!("No attendance to delete");
    }
    Ok(removed)
}

/// ## Summary
/// Lists an event's attendance with user display fields, newest date first,
/// then by last and first name.
///
/// ## Errors
/// Returns `ServiceError::NotFound` for an unknown event and
/// `ServiceError::DatabaseUnavailable` on gateway failure.
#[tracing::instrument(skip(gateway))]
pub async fn list_attendance(
    gateway: &dyn ScheduleGateway,
    event_id: Uuid,
    page: Page,
    filter: AttendanceFilter,
) -> ServiceResult<Paginated<AttendanceEntry>> {
    let event = gateway.get_event(event_id).await?;
    let range = match filter.date {
        Some(date) => DateWindow::single_day(date),
        None => DateWindow::new(event.rule.start_date(), NaiveDate::MAX)?,
    };

    let records: Vec<AttendanceRecord> = gateway
        .get_attendance_for_event(event_id, range)
        .await?
        .into_iter()
        .filter(|record| filter.status.is_none_or(|status| record.status == status))
        .collect();

    let user_ids: Vec<Uuid> = records.iter().map(|record| record.user_id).collect();
    let users: HashMap<Uuid, _> = gateway
        .get_users(user_ids)
        .await?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

    let mut entries: Vec<AttendanceEntry> = records
        .into_iter()
        .map(|record| {
            let user = users.get(&record.user_id);
            AttendanceEntry {
                name_first: user.map(|user| user.name_first.clone()),
                name_last: user.map(|user| user.name_last.clone()),
                doc_id: user.and_then(|user| user.doc_id.clone()),
                record,
            }
        })
        .collect();
    entries.sort_by(|a, b| {
        b.record
            .date
            .cmp(&a.record.date)
            .then_with(|| a.name_last.cmp(&b.name_last))
            .then_with(|| a.name_first.cmp(&b.name_first))
            .then_with(|| a.record.user_id.cmp(&b.record.user_id))
    });

    Ok(page.apply(entries))
}

/// ## Summary
/// Share of enrolled users marked present or partial on `date`.
///
/// ## Errors
/// Returns `ServiceError::DatabaseUnavailable` on gateway failure.
#[tracing::instrument(skip(gateway, event), fields(event_id = %event.id))]
pub async fn attendance_rate(
    gateway: &dyn ScheduleGateway,
    event: &ScheduledEvent,
    date: NaiveDate,
) -> ServiceResult<AttendanceRate> {
    let (enrolled, records) = futures::future::try_join(
        gateway.count_enrolled(event.class_id),
        gateway.get_attendance_for_event(event.id, DateWindow::single_day(date)),
    )
    .await?;

    let attended = records
        .iter()
        .filter(|record| record.status.counts_as_attended())
        .count();
    let attended = u32::try_from(attended).unwrap_or(u32::MAX);

    let attendance_rate = if enrolled == 0 {
        0.0
    } else {
        (f64::from(attended) * 100.0 / f64::from(enrolled)).min(100.0)
    };

    Ok(AttendanceRate {
        date,
        enrolled,
        attended,
        attendance_rate,
    })
}

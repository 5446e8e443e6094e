//! Check-in/check-out time tracking and status derivation.

use cadence_core::constants::TIME_FORMAT;
use cadence_db::db::enums::AttendanceStatus;
use chrono::NaiveTime;

use crate::error::{ServiceError, ServiceResult};

/// Outcome of applying time tracking to a requested status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tracked {
    pub status: AttendanceStatus,
    pub check_in_at: Option<NaiveTime>,
    pub check_out_at: Option<NaiveTime>,
    pub minutes_attended: Option<u32>,
    pub scheduled_minutes: u32,
}

/// ## Summary
/// Parses an optional `HH:MM` value; blank input counts as absent.
///
/// ## Errors
/// Returns `ServiceError::InvalidInput` naming `field` for malformed input.
pub fn parse_clock(field: &str, value: Option<&str>) -> ServiceResult<Option<NaiveTime>> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => NaiveTime::parse_from_str(value, TIME_FORMAT)
            .map(Some)
            .map_err(|_e| ServiceError::InvalidInput(format!("{field} must be in HH:MM format"))),
    }
}

/// ## Summary
/// Derives minutes attended and the final status.
///
/// - Both times: minutes are the difference, capped at `scheduled_minutes`.
/// - Check-in only: an in-progress record with no minutes.
/// - Neither: present and partial records get the scheduled minutes.
///
/// A missing status is derived from the minutes. Present with fewer minutes
/// than scheduled becomes partial.
///
/// ## Errors
/// Returns `ServiceError::InvalidInput` for a check-out without check-in, a
/// non-positive time range, or a partial status without minutes.
pub fn apply_time_tracking(
    requested: Option<AttendanceStatus>,
    check_in_at: Option<NaiveTime>,
    check_out_at: Option<NaiveTime>,
    scheduled_minutes: u32,
) -> ServiceResult<Tracked> {
    let minutes_attended = match (check_in_at, check_out_at) {
        (None, None) => requested
            .filter(|status| status.counts_as_attended())
            .map(|_| scheduled_minutes),
        (Some(_), None) => None,
        (None, Some(_)) => {
            return Err(ServiceError::InvalidInput(
                "check_in_at is required when check_out_at is given".to_string(),
            ));
        }
        (Some(check_in), Some(check_out)) => {
            let minutes = (check_out - check_in).num_minutes();
            if minutes <= 0 {
                return Err(ServiceError::InvalidInput(
                    "check_out_at must be after check_in_at".to_string(),
                ));
            }
            let minutes = u32::try_from(minutes).unwrap_or(u32::MAX);
            Some(if scheduled_minutes == 0 {
                minutes
            } else {
                minutes.min(scheduled_minutes)
            })
        }
    };

    let status = match (requested, minutes_attended) {
        (Some(status), _) => status,
        (None, None) if check_in_at.is_some() => AttendanceStatus::Present,
        (None, None | Some(0)) => AttendanceStatus::AbsentUnexcused,
        (None, Some(minutes)) if minutes < scheduled_minutes => AttendanceStatus::Partial,
        (None, Some(_)) => AttendanceStatus::Present,
    };

    let status = match minutes_attended {
        Some(minutes)
            if status == AttendanceStatus::Present
                && minutes > 0
                && minutes < scheduled_minutes =>
        {
            AttendanceStatus::Partial
        }
        _ => status,
    };

    if status == AttendanceStatus::Partial && minutes_attended.unwrap_or(0) == 0 {
        return Err(ServiceError::InvalidInput(
            "partial attendance requires check-in and check-out times".to_string(),
        ));
    }

    Ok(Tracked {
        status,
        check_in_at,
        check_out_at,
        minutes_attended,
        scheduled_minutes,
    })
}

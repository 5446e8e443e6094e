//! Path and query extraction shared by the schedule handlers.
//!
//! Absent values fall back to defaults; malformed values are rejected with
//! `AppError::BadRequest` rather than silently ignored.

use cadence_core::config::ScheduleConfig;
use cadence_core::constants::DATE_FORMAT;
use cadence_recur::DateWindow;
use cadence_service::error::ServiceError;
use cadence_service::pagination::Page;
use cadence_service::schedule::calendar::{DayOrder, ViewOptions};
use chrono::{Datelike, NaiveDate};
use salvo::Request;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// ## Summary
/// Reads a UUID path parameter.
///
/// ## Errors
/// Returns `AppError::BadRequest` if the parameter is missing or not a UUID.
pub fn path_uuid(req: &Request, name: &str) -> AppResult<Uuid> {
    let raw = req
        .param::<String>(name)
        .ok_or_else(|| AppError::BadRequest(format!("missing path parameter {name}")))?;
    Uuid::parse_str(&raw)
        .map_err(|e| AppError::BadRequest(format!("{name} is not a valid id: {e}")))
}

fn query_value(req: &Request, name: &str) -> Option<String> {
    req.query::<String>(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// ## Errors
/// Returns `AppError::BadRequest` for a value that is not `YYYY-MM-DD`.
pub fn query_date(req: &Request, name: &str) -> AppResult<Option<NaiveDate>> {
    query_value(req, name)
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, DATE_FORMAT)
                .map_err(|e| AppError::BadRequest(format!("{name}={raw} is not a date: {e}")))
        })
        .transpose()
}

fn query_number<T: std::str::FromStr>(req: &Request, name: &str) -> AppResult<Option<T>> {
    query_value(req, name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_e| AppError::BadRequest(format!("{name}={raw} is not a valid number")))
        })
        .transpose()
}

fn query_bool(req: &Request, name: &str) -> AppResult<Option<bool>> {
    query_value(req, name)
        .map(|raw| match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(AppError::BadRequest(format!("{name}={raw} is not a boolean"))),
        })
        .transpose()
}

/// ## Summary
/// Resolves the requested date window.
///
/// `start` and `end` (exclusive) select an explicit range and must come
/// together. Otherwise `year` and `month` select a calendar month, each
/// defaulting to the month containing `today`.
///
/// ## Errors
/// Returns `AppError::BadRequest` for malformed values and
/// `ServiceError::InvalidRange` for a reversed range or an invalid month.
pub fn window_from_query(req: &Request, today: NaiveDate) -> AppResult<DateWindow> {
    match (query_date(req, "start")?, query_date(req, "end")?) {
        (Some(start), Some(end)) => Ok(DateWindow::new(start, end).map_err(ServiceError::from)?),
        (None, None) => {
            let year = query_number::<i32>(req, "year")?.unwrap_or_else(|| today.year());
            let month = query_number::<u32>(req, "month")?.unwrap_or_else(|| today.month());
            Ok(DateWindow::month(year, month).map_err(ServiceError::from)?)
        }
        _ => Err(AppError::BadRequest(
            "start and end must be given together".to_string(),
        )),
    }
}

/// ## Errors
/// Returns `AppError::BadRequest` for non-numeric paging values.
pub fn page_from_query(req: &Request, settings: &ScheduleConfig) -> AppResult<Page> {
    Ok(Page::from_query(
        query_number(req, "page")?,
        query_number(req, "per_page")?,
        settings,
    ))
}

/// ## Errors
/// Returns `AppError::BadRequest` for an unknown order or a non-boolean flag.
pub fn view_from_query(req: &Request) -> AppResult<ViewOptions> {
    let order = match query_value(req, "order").as_deref() {
        None | Some("by_start_time" | "start_time") => DayOrder::ByStartTime,
        Some("by_room" | "room") => DayOrder::ByRoom,
        Some(other) => {
            return Err(AppError::BadRequest(format!("unknown order {other}")));
        }
    };
    Ok(ViewOptions {
        order,
        include_cancelled: query_bool(req, "include_cancelled")?.unwrap_or(false),
    })
}

/// ## Summary
/// Reads a comma-separated list of UUIDs.
///
/// ## Errors
/// Returns `AppError::BadRequest` if the list is missing or holds a non-UUID.
pub fn query_uuid_list(req: &Request, name: &str) -> AppResult<Vec<Uuid>> {
    let raw = query_value(req, name)
        .ok_or_else(|| AppError::BadRequest(format!("missing query parameter {name}")))?;
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            Uuid::parse_str(id)
                .map_err(|e| AppError::BadRequest(format!("{name} holds an invalid id {id}: {e}")))
        })
        .collect()
}

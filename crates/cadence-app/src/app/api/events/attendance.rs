use cadence_db::db::UpsertOutcome;
use cadence_db::db::enums::AttendanceStatus;
use cadence_service::attendance::{
    self as service, AttendanceEntry, AttendanceFilter, AttendanceRate, LogAttendance,
    LoggedAttendance,
};
use cadence_service::context::{ScheduleContext, load_event_context};
use cadence_service::pagination::Paginated;
use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use crate::app::api::params::{page_from_query, path_uuid, query_date};
use crate::config::get_config_from_depot;
use crate::error::{AppError, AppResult, respond};
use crate::gateway_handler::get_gateway_from_depot;

async fn log(req: &mut Request, depot: &mut Depot) -> AppResult<LoggedAttendance> {
    let settings = get_config_from_depot(depot)?;
    let gateway = get_gateway_from_depot(depot)?;
    let event_id = path_uuid(req, "event_id")?;
    let request: LogAttendance = req.parse_json().await.map_err(|e| {
        tracing::debug!(error = ?e, "Failed to parse attendance request");
        AppError::BadRequest(format!("invalid attendance body: {e}"))
    })?;
    let context = load_event_context(gateway.as_ref(), event_id, &settings.schedule).await?;
    let now = ScheduleContext::now(context.timezone);
    Ok(service::log_attendance(gateway.as_ref(), &context.event, &now, request).await?)
}

/// ## Summary
/// POST /events/{event_id}/attendance - records one user's attendance at
/// one occurrence. Answers 201 for a new record and 200 otherwise.
#[handler]
pub async fn log_attendance(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result = log(req, depot).await;
    let status = match &result {
        Ok(logged) if logged.outcome == UpsertOutcome::Created => StatusCode::CREATED,
        _ => StatusCode::OK,
    };
    respond(res, status, result);
}

async fn list(req: &mut Request, depot: &mut Depot) -> AppResult<Paginated<AttendanceEntry>> {
    let settings = get_config_from_depot(depot)?;
    let gateway = get_gateway_from_depot(depot)?;
    let event_id = path_uuid(req, "event_id")?;
    let page = page_from_query(req, &settings.schedule)?;
    let status = match req.query::<String>("status") {
        Some(raw) if !raw.trim().is_empty() => Some(
            AttendanceStatus::parse(raw.trim())
                .ok_or_else(|| AppError::BadRequest(format!("unknown status {raw}")))?,
        ),
        _ => None,
    };
    let filter = AttendanceFilter {
        date: query_date(req, "date")?,
        status,
    };
    Ok(service::list_attendance(gateway.as_ref(), event_id, page, filter).await?)
}

/// ## Summary
/// GET /events/{event_id}/attendance - records joined with user names,
/// newest date first. Optional `date` and `status` filters.
#[handler]
pub async fn list_attendance(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    respond(res, StatusCode::OK, list(req, depot).await);
}

async fn remove(req: &mut Request, depot: &mut Depot) -> AppResult<bool> {
    let gateway = get_gateway_from_depot(depot)?;
    let event_id = path_uuid(req, "event_id")?;
    let user_id = path_uuid(req, "user_id")?;
    let date = query_date(req, "date")?
        .ok_or_else(|| AppError::BadRequest("missing query parameter date".to_string()))?;
    Ok(service::delete_attendance(gateway.as_ref(), event_id, user_id, date).await?)
}

/// ## Summary
/// DELETE /events/{event_id}/attendance/{user_id}?date=YYYY-MM-DD
///
/// Answers 204 whether or not a record existed.
#[handler]
pub async fn delete_attendance(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match remove(req, depot).await {
        Ok(_) => {
            res.status_code(StatusCode::NO_CONTENT);
        }
        Err(err) => err.render(res),
    }
}

async fn rate(req: &mut Request, depot: &mut Depot) -> AppResult<AttendanceRate> {
    let settings = get_config_from_depot(depot)?;
    let gateway = get_gateway_from_depot(depot)?;
    let event_id = path_uuid(req, "event_id")?;
    let context = load_event_context(gateway.as_ref(), event_id, &settings.schedule).await?;
    let date = match query_date(req, "date")? {
        Some(date) => date,
        None => ScheduleContext::now(context.timezone).today,
    };
    Ok(service::attendance_rate(gateway.as_ref(), &context.event, date).await?)
}

/// ## Summary
/// GET /events/{event_id}/attendance/rate - share of enrolled users present
/// or partial on `date`, defaulting to the facility's today.
#[handler]
pub async fn attendance_rate(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    respond(res, StatusCode::OK, rate(req, depot).await);
}

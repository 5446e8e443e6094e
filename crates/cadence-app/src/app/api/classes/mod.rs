//! Event creation under `/api/classes/{class_id}/events`.

use cadence_db::model::schedule::ScheduledEvent;
use cadence_service::schedule::write::{NewEventRequest, create_event};
use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, Router, handler};

use crate::app::api::CLASSES_ROUTE_COMPONENT;
use crate::app::api::params::path_uuid;
use crate::config::get_config_from_depot;
use crate::error::{AppError, AppResult, respond};
use crate::gateway_handler::get_gateway_from_depot;

async fn create(req: &mut Request, depot: &mut Depot) -> AppResult<ScheduledEvent> {
    let settings = get_config_from_depot(depot)?;
    let gateway = get_gateway_from_depot(depot)?;
    let class_id = path_uuid(req, "class_id")?;
    let request: NewEventRequest = req.parse_json().await.map_err(|e| {
        tracing::debug!(error = ?e, "Failed to parse event request");
        AppError::BadRequest(format!("invalid event body: {e}"))
    })?;
    Ok(create_event(gateway.as_ref(), class_id, request, &settings.schedule).await?)
}

/// ## Summary
/// POST /classes/{class_id}/events - schedules a recurring event from a
/// structured `rule` or a `DTSTART`/`RRULE` text `rrule`.
#[handler]
async fn create_class_event(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    respond(res, StatusCode::CREATED, create(req, depot).await);
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(CLASSES_ROUTE_COMPONENT)
        .push(Router::with_path("{class_id}/events").post(create_class_event))
}

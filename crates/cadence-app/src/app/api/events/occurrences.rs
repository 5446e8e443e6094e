use cadence_service::context::{ScheduleContext, load_event_context};
use cadence_service::pagination::Paginated;
use cadence_service::schedule::occurrence::{
    EventDate, EventInstance, event_instances_with_attendance, event_occurrence_dates,
};
use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use crate::app::api::params::{page_from_query, path_uuid, window_from_query};
use crate::config::get_config_from_depot;
use crate::error::{AppResult, respond};
use crate::gateway_handler::get_gateway_from_depot;

async fn dates(req: &mut Request, depot: &mut Depot) -> AppResult<Vec<EventDate>> {
    let settings = get_config_from_depot(depot)?;
    let gateway = get_gateway_from_depot(depot)?;
    let event_id = path_uuid(req, "event_id")?;
    let context = load_event_context(gateway.as_ref(), event_id, &settings.schedule).await?;
    let today = ScheduleContext::now(context.timezone).today;
    let window = window_from_query(req, today)?;
    Ok(event_occurrence_dates(gateway.as_ref(), event_id, window, &settings.schedule).await?)
}

/// ## Summary
/// GET /events/{event_id}/dates - live occurrence dates with their
/// `HH:MM-HH:MM` class time, month defaulting to the facility's current one.
#[handler]
pub async fn event_dates(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    respond(res, StatusCode::OK, dates(req, depot).await);
}

async fn instances(req: &mut Request, depot: &mut Depot) -> AppResult<Paginated<EventInstance>> {
    let settings = get_config_from_depot(depot)?;
    let gateway = get_gateway_from_depot(depot)?;
    let event_id = path_uuid(req, "event_id")?;
    let context = load_event_context(gateway.as_ref(), event_id, &settings.schedule).await?;
    let today = ScheduleContext::now(context.timezone).today;
    let window = window_from_query(req, today)?;
    let page = page_from_query(req, &settings.schedule)?;
    Ok(event_instances_with_attendance(
        gateway.as_ref(),
        event_id,
        window,
        page,
        &settings.schedule,
    )
    .await?)
}

/// ## Summary
/// GET /events/{event_id}/instances - resolved occurrences with their
/// attendance, newest first, paginated.
#[handler]
pub async fn event_instances(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    respond(res, StatusCode::OK, instances(req, depot).await);
}

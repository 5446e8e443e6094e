//! Calendar endpoints under `/api/facilities`.

use cadence_db::db::CalendarScope;
use cadence_service::context::{default_context, load_facility_context};
use cadence_service::schedule::calendar::{Calendar, build_calendar, build_calendars};
use chrono::Utc;
use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, Router, handler};

use crate::app::api::FACILITIES_ROUTE_COMPONENT;
use crate::app::api::params::{path_uuid, query_uuid_list, view_from_query, window_from_query};
use crate::config::get_config_from_depot;
use crate::error::{AppResult, respond};
use crate::gateway_handler::get_gateway_from_depot;

async fn calendar_for(
    req: &mut Request,
    depot: &mut Depot,
    scope: CalendarScope,
) -> AppResult<Calendar> {
    let settings = get_config_from_depot(depot)?;
    let gateway = get_gateway_from_depot(depot)?;
    let context = load_facility_context(
        gateway.as_ref(),
        scope.facility_id(),
        &settings.schedule,
        Utc::now(),
    )
    .await?;
    let window = window_from_query(req, context.today)?;
    let view = view_from_query(req)?;
    Ok(build_calendar(gateway.as_ref(), scope, window, view, &settings.schedule).await?)
}

/// ## Summary
/// GET /facilities/{facility_id}/calendar - every live event at the facility.
///
/// Query: `year`/`month` or `start`/`end`, plus `order` and `include_cancelled`.
#[handler]
async fn facility_calendar(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result = match path_uuid(req, "facility_id") {
        Ok(facility_id) => calendar_for(req, depot, CalendarScope::Facility(facility_id)).await,
        Err(err) => Err(err),
    };
    respond(res, StatusCode::OK, result);
}

/// ## Summary
/// GET /facilities/{facility_id}/users/{user_id}/calendar - events of the
/// classes the user is enrolled in.
#[handler]
async fn user_calendar(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let scope = path_uuid(req, "facility_id").and_then(|facility_id| {
        Ok(CalendarScope::User {
            facility_id,
            user_id: path_uuid(req, "user_id")?,
        })
    });
    let result = match scope {
        Ok(scope) => calendar_for(req, depot, scope).await,
        Err(err) => Err(err),
    };
    respond(res, StatusCode::OK, result);
}

async fn combined(req: &mut Request, depot: &mut Depot) -> AppResult<Vec<Calendar>> {
    let settings = get_config_from_depot(depot)?;
    let gateway = get_gateway_from_depot(depot)?;
    let scopes: Vec<CalendarScope> = query_uuid_list(req, "ids")?
        .into_iter()
        .map(CalendarScope::Facility)
        .collect();
    let today = default_context(&settings.schedule, Utc::now())?.today;
    let window = window_from_query(req, today)?;
    let view = view_from_query(req)?;
    Ok(build_calendars(gateway.as_ref(), &scopes, window, view, &settings.schedule).await?)
}

/// ## Summary
/// GET /facilities/calendars?ids=a,b - one calendar per listed facility,
/// built concurrently.
#[handler]
async fn facility_calendars(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    respond(res, StatusCode::OK, combined(req, depot).await);
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(FACILITIES_ROUTE_COMPONENT)
        .push(Router::with_path("calendars").get(facility_calendars))
        .push(
            Router::with_path("{facility_id}")
                .push(Router::with_path("calendar").get(facility_calendar))
                .push(Router::with_path("users/{user_id}/calendar").get(user_calendar)),
        )
}

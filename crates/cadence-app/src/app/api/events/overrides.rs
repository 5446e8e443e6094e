use cadence_db::model::schedule::Override;
use cadence_service::schedule::write::{OverrideRequest, create_override as append_override};
use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use crate::app::api::params::path_uuid;
use crate::error::{AppError, AppResult, respond};
use crate::gateway_handler::get_gateway_from_depot;

async fn append(req: &mut Request, depot: &mut Depot) -> AppResult<Override> {
    let gateway = get_gateway_from_depot(depot)?;
    let event_id = path_uuid(req, "event_id")?;
    let request: OverrideRequest = req.parse_json().await.map_err(|e| {
        tracing::debug!(error = ?e, "Failed to parse override request");
        AppError::BadRequest(format!("invalid override body: {e}"))
    })?;
    Ok(append_override(gateway.as_ref(), event_id, request).await?)
}

/// ## Summary
/// PUT /events/{event_id}/overrides - appends a cancellation or
/// rescheduling for one occurrence or for every occurrence from a date on.
///
/// ## Errors
/// Returns HTTP 409 if a forward override already exists for that date.
#[handler]
pub async fn create_override(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    respond(res, StatusCode::CREATED, append(req, depot).await);
}

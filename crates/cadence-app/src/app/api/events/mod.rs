//! Per-event endpoints under `/api/events/{event_id}`.

use salvo::Router;

use crate::app::api::EVENTS_ROUTE_COMPONENT;

pub mod attendance;
pub mod occurrences;
pub mod overrides;

#[must_use]
pub fn routes() -> Router {
    Router::with_path(EVENTS_ROUTE_COMPONENT).push(
        Router::with_path("{event_id}")
            .push(Router::with_path("dates").get(occurrences::event_dates))
            .push(Router::with_path("instances").get(occurrences::event_instances))
            .push(Router::with_path("overrides").put(overrides::create_override))
            .push(
                Router::with_path("attendance")
                    .get(attendance::list_attendance)
                    .post(attendance::log_attendance)
                    .push(Router::with_path("rate").get(attendance::attendance_rate))
                    .push(Router::with_path("{user_id}").delete(attendance::delete_attendance)),
            ),
    )
}

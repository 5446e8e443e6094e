mod app_specific;
mod classes;
mod events;
mod facilities;
pub mod params;

use salvo::Router;

// Re-export route constants from core
pub use cadence_core::constants::{
    API_ROUTE_COMPONENT, API_ROUTE_PREFIX, CLASSES_ROUTE_COMPONENT, CLASSES_ROUTE_PREFIX,
    EVENTS_ROUTE_COMPONENT, EVENTS_ROUTE_PREFIX, FACILITIES_ROUTE_COMPONENT,
    FACILITIES_ROUTE_PREFIX,
};

/// ## Summary
/// Constructs the main API router with every schedule and attendance handler.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .push(app_specific::routes())
        .push(facilities::routes())
        .push(events::routes())
        .push(classes::routes())
}

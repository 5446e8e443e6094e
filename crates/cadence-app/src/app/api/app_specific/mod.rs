// Service-level endpoints that are not part of the schedule API.

use salvo::Router;

mod healthcheck;

#[must_use]
pub fn routes() -> Router {
    Router::with_path("app").push(healthcheck::routes())
}

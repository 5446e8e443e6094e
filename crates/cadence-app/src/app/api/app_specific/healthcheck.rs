use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Response, Router, handler};
use serde::Serialize;

use crate::gateway_handler::get_gateway_from_depot;

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
}

#[handler]
async fn hello() -> &'static str {
    "OK"
}

/// GET /app/healthcheck/ready - 503 while the gateway is unreachable.
#[handler]
async fn ready(depot: &mut Depot, res: &mut Response) {
    let reachable = match get_gateway_from_depot(depot) {
        // Any answer from the store, including "not found", means it is up.
        Ok(gateway) => match gateway.get_facility(uuid::Uuid::nil()).await {
            Ok(_) => true,
            Err(err) => !err.is_unavailable(),
        },
        Err(_) => false,
    };
    if reachable {
        res.render(Json(Health { status: "ready" }));
    } else {
        res.status_code(StatusCode::SERVICE_UNAVAILABLE);
        res.render(Json(Health {
            status: "unavailable",
        }));
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("healthcheck")
        .get(hello)
        .push(Router::with_path("ready").get(ready))
}

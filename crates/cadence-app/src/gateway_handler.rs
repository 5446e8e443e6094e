use std::sync::Arc;

use cadence_core::error::CoreError;
use cadence_db::db::ScheduleGateway;
use salvo::async_trait;

use crate::error::AppResult;

/// Shares one gateway with every request through the depot.
pub struct GatewayHandler {
    pub gateway: Arc<dyn ScheduleGateway>,
}

#[async_trait]
impl salvo::Handler for GatewayHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.gateway));
    }
}

/// ## Summary
/// Retrieves the schedule gateway from the depot.
///
/// ## Errors
/// Returns an error if the gateway is not found in the depot.
pub fn get_gateway_from_depot(depot: &salvo::Depot) -> AppResult<Arc<dyn ScheduleGateway>> {
    depot
        .obtain::<Arc<dyn ScheduleGateway>>()
        .cloned()
        .map_err(|_err| CoreError::MissingState("Schedule gateway not found in depot").into())
}

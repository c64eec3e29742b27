//! Order Statistics Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, responses::OrderStatisticsResponse},
    state::State,
};

/// Order Statistics Handler
#[endpoint(
    tags("orders"),
    summary = "Order Statistics",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Aggregate order figures"),
        (status_code = StatusCode::FORBIDDEN, description = "Operator role required"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<OrderStatisticsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    depot.operator_or_403()?;

    let statistics = state
        .app
        .orders
        .statistics()
        .await
        .map_err(into_status_error)?;

    Ok(Json(statistics.into()))
}

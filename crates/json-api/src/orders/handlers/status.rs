//! Update Order Status Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use emporium_app::domain::orders::{data::OrderStatusUpdate, status::OrderStatus};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, responses::OrderResponse},
    state::State,
};

/// Update Order Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateOrderStatusRequest {
    /// `processing`, `shipped`, `delivered` or `cancelled`
    pub status: String,

    /// Replaces the order's notes
    pub notes: Option<String>,

    pub tracking_number: Option<String>,
    pub payment_reference: Option<String>,
}

impl UpdateOrderStatusRequest {
    fn into_update(self) -> Result<OrderStatusUpdate, StatusError> {
        Ok(OrderStatusUpdate {
            status: self.status.parse::<OrderStatus>().or_400()?,
            notes: self.notes,
            tracking_number: self.tracking_number,
            payment_reference: self.payment_reference,
        })
    }
}

/// Update Order Status Handler
///
/// Operators move orders along their lifecycle. Cancelling a pending or
/// processing order releases its stock.
#[endpoint(
    tags("orders"),
    summary = "Update Order Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown status"),
        (status_code = StatusCode::FORBIDDEN, description = "Operator role required"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Transition not allowed"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<UpdateOrderStatusRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let operator = depot.operator_or_403()?;
    let update = json.into_inner().into_update()?;

    let order = state
        .app
        .orders
        .update_order_status(order.into_inner().into(), update)
        .await
        .map_err(into_status_error)?;

    info!(
        order_uuid = %order.uuid,
        status = %order.status,
        operator_uuid = %operator.user,
        "order status updated"
    );

    Ok(Json(order.into()))
}

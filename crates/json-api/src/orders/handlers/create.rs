//! Place Order Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use emporium_app::domain::orders::{data::NewOrder, records::OrderUuid};

use crate::{
    extensions::*,
    observability::observe_order_placement,
    orders::{
        errors::{into_status_error, placement_outcome},
        responses::{AddressBody, OrderResponse},
    },
    state::State,
};

/// Place Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PlaceOrderRequest {
    /// Client-chosen order identifier. Retrying with the same uuid never
    /// creates a second order.
    pub uuid: Uuid,

    /// The cart to convert
    pub cart_uuid: Uuid,

    pub shipping_address: AddressBody,

    /// Defaults to the shipping address
    pub billing_address: Option<AddressBody>,

    pub payment_method: String,
    pub notes: Option<String>,
}

impl From<PlaceOrderRequest> for NewOrder {
    fn from(request: PlaceOrderRequest) -> Self {
        NewOrder {
            uuid: OrderUuid::from_uuid(request.uuid),
            cart: request.cart_uuid.into(),
            shipping_address: request.shipping_address.into(),
            billing_address: request.billing_address.map(Into::into),
            payment_method: request.payment_method,
            notes: request.notes,
        }
    }
}

/// Place Order Handler
///
/// Converts the caller's cart into a pending order and reserves stock for
/// every line. Either all of it happens or none of it does.
#[endpoint(
    tags("orders"),
    summary = "Place Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid order"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart not found"),
        (status_code = StatusCode::CONFLICT, description = "Empty cart, unavailable product, price change, insufficient stock or duplicate order"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<PlaceOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let order = match state
        .app
        .orders
        .create_order(principal.user, json.into_inner().into())
        .await
    {
        Ok(order) => order,
        Err(error) => {
            observe_order_placement(placement_outcome(&error));

            return Err(into_status_error(error));
        }
    };

    observe_order_placement("created");

    info!(order_uuid = %order.uuid, total = order.total, "order placed");

    res.add_header(LOCATION, format!("/orders/{}", order.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(order.into()))
}

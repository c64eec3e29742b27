//! Adjust Stock Handler

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

use emporium_app::domain::inventory::{data::StockAdjustment, records::AdjustmentReason};

use crate::{
    extensions::*,
    inventory::{errors::into_status_error, responses::InventoryResponse},
    state::State,
};

/// Adjust Stock Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AdjustStockRequest {
    /// Signed change to on-hand quantity
    pub delta: i64,

    /// `restock`, `damage`, `correction` or `return`
    pub reason: String,

    pub note: Option<String>,
}

/// Adjust Stock Handler
///
/// Applies an out-of-band change to on-hand quantity and records it in the
/// adjustment ledger. The result can never drop below what is reserved.
#[endpoint(
    tags("inventory"),
    summary = "Adjust Stock",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Stock adjusted"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid adjustment"),
        (status_code = StatusCode::FORBIDDEN, description = "Operator role required"),
        (status_code = StatusCode::NOT_FOUND, description = "No inventory for product"),
        (status_code = StatusCode::CONFLICT, description = "Would drop below reserved stock"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<AdjustStockRequest>,
    depot: &mut Depot,
) -> Result<Json<InventoryResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let operator = depot.operator_or_403()?;
    let request = json.into_inner();

    let adjustment = StockAdjustment {
        delta: request.delta,
        reason: request.reason.parse::<AdjustmentReason>().or_400()?,
        note: request.note,
    };

    let reason = adjustment.reason;

    let inventory = state
        .app
        .inventory
        .adjust_stock(product.into_inner().into(), adjustment)
        .await
        .map_err(into_status_error)?;

    info!(
        product_uuid = %inventory.product_uuid,
        delta = request.delta,
        %reason,
        quantity = inventory.quantity,
        operator_uuid = %operator.user,
        "stock adjusted"
    );

    Ok(Json(inventory.into()))
}

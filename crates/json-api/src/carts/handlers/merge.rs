//! Merge Guest Cart Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    carts::{errors::into_status_error, responses::CartResponse},
    extensions::*,
    state::State,
};

/// Merge Guest Cart Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MergeGuestCartRequest {
    /// Token identifying the anonymous session's cart
    pub guest_token: String,
}

/// Merge Guest Cart Handler
///
/// Moves a guest cart's lines into the caller's cart and retires the guest cart.
#[endpoint(
    tags("carts"),
    summary = "Merge Guest Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Merged cart"),
        (status_code = StatusCode::NOT_FOUND, description = "Guest cart not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<MergeGuestCartRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let cart = state
        .app
        .carts
        .merge_guest_cart(json.into_inner().guest_token, principal.user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}

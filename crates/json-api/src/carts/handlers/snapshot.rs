//! Cart Snapshot Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use emporium_app::domain::carts::records::CartOwner;

use crate::{
    carts::{errors::into_status_error, responses::CartSnapshotResponse},
    extensions::*,
    state::State,
};

/// Cart Snapshot Handler
///
/// Prices the cart against the current catalog without changing it.
#[endpoint(
    tags("carts"),
    summary = "Price Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Priced cart"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart not found"),
    ),
)]
pub(crate) async fn handler(
    cart: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CartSnapshotResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let snapshot = state
        .app
        .carts
        .snapshot(CartOwner::User(principal.user), cart.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(snapshot.into()))
}

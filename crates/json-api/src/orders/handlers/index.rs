//! Order Index Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use emporium_app::domain::orders::{
    data::{OrderListQuery, OrderSortField, SortDirection},
    status::OrderStatus,
};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, responses::OrderPageResponse},
    state::State,
};

/// Order Index Handler
///
/// Buyers see their own orders; operators see every order.
#[endpoint(
    tags("orders"),
    summary = "List Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "One page of orders"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid filter, sort or page"),
    ),
)]
pub(crate) async fn handler(
    status: QueryParam<String, false>,
    search: QueryParam<String, false>,
    sort_by: QueryParam<String, false>,
    direction: QueryParam<String, false>,
    page: QueryParam<u32, false>,
    page_size: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<OrderPageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let defaults = OrderListQuery::default();

    let query = OrderListQuery {
        status: status
            .into_inner()
            .map(|value| value.parse::<OrderStatus>())
            .transpose()
            .or_400()?,
        search: search.into_inner(),
        sort_by: sort_by
            .into_inner()
            .map(|value| value.parse::<OrderSortField>())
            .transpose()
            .or_400()?
            .unwrap_or(defaults.sort_by),
        direction: direction
            .into_inner()
            .map(|value| value.parse::<SortDirection>())
            .transpose()
            .or_400()?
            .unwrap_or(defaults.direction),
        page: page.into_inner().unwrap_or(defaults.page),
        page_size: page_size.into_inner().unwrap_or(defaults.page_size),
    };

    let owner = (!principal.is_operator()).then_some(principal.user);

    let page = state
        .app
        .orders
        .list_orders(owner, query)
        .await
        .map_err(into_status_error)?;

    Ok(Json(page.into()))
}

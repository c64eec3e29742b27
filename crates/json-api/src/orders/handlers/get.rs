//! Get Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, responses::OrderResponse},
    state::State,
};

/// Get Order Handler
///
/// Buyers can only see their own orders; a foreign order is reported as missing.
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order with items"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let owner = (!principal.is_operator()).then_some(principal.user);

    let order = state
        .app
        .orders
        .get_order(owner, order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use emporium_app::domain::orders::{
        OrdersServiceError, records::OrderUuid, status::OrderStatus,
    };

    use crate::{
        orders::responses::fixtures::make_order,
        test_helpers::{TEST_BUYER, TestServices, buyer_service},
    };

    use super::*;

    fn make_service(services: TestServices) -> Service {
        buyer_service(services, Router::with_path("orders/{order}").get(handler))
    }

    #[tokio::test]
    async fn returns_the_buyers_order() -> TestResult {
        let order = OrderUuid::new();
        let mut services = TestServices::default();

        services
            .orders
            .expect_get_order()
            .once()
            .withf(move |owner, uuid| *owner == Some(TEST_BUYER.user) && *uuid == order)
            .return_once(move |_, _| Ok(make_order(order, TEST_BUYER.user, OrderStatus::Shipped)));

        let mut res = TestClient::get(format!("http://example.com/orders/{order}"))
            .send(&make_service(services))
            .await;

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.uuid, order.into_uuid());
        assert_eq!(body.status, "shipped");
        assert_eq!(body.item_count, 2);

        Ok(())
    }

    #[tokio::test]
    async fn foreign_order_returns_404() {
        let mut services = TestServices::default();

        services
            .orders
            .expect_get_order()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/orders/{}", OrderUuid::new()))
            .send(&make_service(services))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }
}

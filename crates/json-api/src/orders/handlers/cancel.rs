//! Cancel Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use tracing::info;
use uuid::Uuid;

use crate::{extensions::*, orders::errors::into_status_error, state::State};

/// Cancel Order Handler
///
/// Cancels one of the caller's pending orders and releases its stock.
#[endpoint(
    tags("orders"),
    summary = "Cancel Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Order cancelled"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order is no longer pending"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let order = order.into_inner();

    state
        .app
        .orders
        .cancel_order(principal.user, order.into())
        .await
        .map_err(into_status_error)?;

    info!(order_uuid = %order, "order cancelled by buyer");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;

    use emporium_app::domain::orders::{
        OrdersServiceError, records::OrderUuid, status::OrderStatus,
    };

    use crate::test_helpers::{TEST_BUYER, TestServices, buyer_service};

    use super::*;

    fn make_service(services: TestServices) -> Service {
        buyer_service(
            services,
            Router::with_path("orders/{order}/cancel").post(handler),
        )
    }

    #[tokio::test]
    async fn cancels_pending_order() {
        let order = OrderUuid::new();
        let mut services = TestServices::default();

        services
            .orders
            .expect_cancel_order()
            .once()
            .withf(move |owner, uuid| *owner == TEST_BUYER.user && *uuid == order)
            .return_once(|_, _| Ok(()));

        let res = TestClient::post(format!("http://example.com/orders/{order}/cancel"))
            .send(&make_service(services))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NO_CONTENT));
    }

    #[tokio::test]
    async fn processing_order_returns_409() {
        let mut services = TestServices::default();

        services
            .orders
            .expect_cancel_order()
            .once()
            .return_once(|_, _| {
                Err(OrdersServiceError::InvalidTransition {
                    from: OrderStatus::Processing,
                    to: OrderStatus::Cancelled,
                })
            });

        let res = TestClient::post(format!("http://example.com/orders/{}/cancel", OrderUuid::new()))
            .send(&make_service(services))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
    }
}

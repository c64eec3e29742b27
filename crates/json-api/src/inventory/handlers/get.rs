//! Get Inventory Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    inventory::{errors::into_status_error, responses::InventoryResponse},
    state::State,
};

/// Get Inventory Handler
#[endpoint(
    tags("inventory"),
    summary = "Get Inventory",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Stock counts"),
        (status_code = StatusCode::FORBIDDEN, description = "Operator role required"),
        (status_code = StatusCode::NOT_FOUND, description = "No inventory for product"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<InventoryResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    depot.operator_or_403()?;

    let inventory = state
        .app
        .inventory
        .get_inventory(product.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(inventory.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use emporium_app::domain::{
        inventory::InventoryServiceError, products::records::ProductUuid,
    };

    use crate::{
        inventory::responses::fixtures::make_inventory,
        test_helpers::{TestServices, buyer_service, operator_service},
    };

    use super::*;

    fn route() -> Router {
        Router::with_path("inventory/{product}").get(handler)
    }

    #[tokio::test]
    async fn reports_available_stock() -> TestResult {
        let product = ProductUuid::new();
        let mut services = TestServices::default();

        services
            .inventory
            .expect_get_inventory()
            .once()
            .withf(move |uuid| *uuid == product)
            .return_once(move |_| Ok(make_inventory(product, 10, 3)));

        let mut res = TestClient::get(format!("http://example.com/inventory/{product}"))
            .send(&operator_service(services, route()))
            .await;

        let body: InventoryResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.quantity, 10);
        assert_eq!(body.reserved, 3);
        assert_eq!(body.available, 7);

        Ok(())
    }

    #[tokio::test]
    async fn missing_inventory_returns_404() {
        let mut services = TestServices::default();

        services
            .inventory
            .expect_get_inventory()
            .once()
            .return_once(|_| Err(InventoryServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/inventory/{}", ProductUuid::new()))
            .send(&operator_service(services, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn buyers_are_forbidden() {
        let res = TestClient::get(format!("http://example.com/inventory/{}", ProductUuid::new()))
            .send(&buyer_service(TestServices::default(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));
    }
}

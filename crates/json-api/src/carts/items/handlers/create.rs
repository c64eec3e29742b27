//! Add Cart Item Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use emporium_app::domain::carts::{
    data::NewCartItem,
    records::{CartItemUuid, CartOwner},
};

use crate::{
    carts::{errors::into_status_error, responses::CartItemResponse},
    extensions::*,
    state::State,
};

/// Add Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddCartItemRequest {
    /// Client-chosen line identifier; generated when omitted
    pub uuid: Option<Uuid>,

    pub product_uuid: Uuid,
    pub quantity: u32,
}

impl From<AddCartItemRequest> for NewCartItem {
    fn from(request: AddCartItemRequest) -> Self {
        NewCartItem {
            uuid: request.uuid.map_or_else(CartItemUuid::new, CartItemUuid::from_uuid),
            product_uuid: request.product_uuid.into(),
            quantity: request.quantity,
        }
    }
}

/// Add Cart Item Handler
///
/// Adding a product already in the cart increases that line's quantity.
#[endpoint(
    tags("carts"),
    summary = "Add Cart Item",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Item added"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart or product not found"),
        (status_code = StatusCode::CONFLICT, description = "Product not available"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
    ),
)]
pub(crate) async fn handler(
    cart: PathParam<Uuid>,
    json: JsonBody<AddCartItemRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CartItemResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let item = state
        .app
        .carts
        .add_item(
            CartOwner::User(principal.user),
            cart.into_inner().into(),
            json.into_inner().into(),
        )
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(item.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use emporium_app::domain::{
        carts::{CartsServiceError, records::CartUuid},
        products::records::ProductUuid,
    };

    use crate::{
        carts::responses::fixtures::make_item,
        test_helpers::{TEST_BUYER, TestServices, buyer_service},
    };

    use super::*;

    fn make_service(services: TestServices) -> Service {
        buyer_service(services, Router::with_path("carts/{cart}/items").post(handler))
    }

    #[tokio::test]
    async fn adds_item_to_cart() -> TestResult {
        let cart = CartUuid::new();
        let product = ProductUuid::new();
        let mut services = TestServices::default();

        services
            .carts
            .expect_add_item()
            .once()
            .withf(move |owner, uuid, item| {
                *owner == CartOwner::User(TEST_BUYER.user)
                    && *uuid == cart
                    && item.product_uuid == product
                    && item.quantity == 2
            })
            .return_once(move |_, _, _| Ok(make_item(cart, product, 2)));

        let mut res = TestClient::post(format!("http://example.com/carts/{cart}/items"))
            .json(&json!({ "product_uuid": product.into_uuid(), "quantity": 2 }))
            .send(&make_service(services))
            .await;

        let body: CartItemResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(body.product_uuid, product.into_uuid());
        assert_eq!(body.quantity, 2);

        Ok(())
    }

    #[tokio::test]
    async fn unavailable_product_returns_409() {
        let product = ProductUuid::new();
        let mut services = TestServices::default();

        services
            .carts
            .expect_add_item()
            .once()
            .return_once(move |_, _, _| Err(CartsServiceError::ProductUnavailable { product }));

        let res = TestClient::post(format!("http://example.com/carts/{}/items", CartUuid::new()))
            .json(&json!({ "product_uuid": product.into_uuid(), "quantity": 1 }))
            .send(&make_service(services))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
    }

    #[tokio::test]
    async fn zero_quantity_returns_400() {
        let mut services = TestServices::default();

        services
            .carts
            .expect_add_item()
            .once()
            .return_once(|_, _, _| Err(CartsServiceError::Validation("quantity must be positive")));

        let res = TestClient::post(format!("http://example.com/carts/{}/items", CartUuid::new()))
            .json(&json!({ "product_uuid": Uuid::now_v7(), "quantity": 0 }))
            .send(&make_service(services))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn unknown_product_returns_404() {
        let product = ProductUuid::new();
        let mut services = TestServices::default();

        services
            .carts
            .expect_add_item()
            .once()
            .return_once(move |_, _, _| Err(CartsServiceError::UnknownProduct { product }));

        let res = TestClient::post(format!("http://example.com/carts/{}/items", CartUuid::new()))
            .json(&json!({ "product_uuid": product.into_uuid(), "quantity": 1 }))
            .send(&make_service(services))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }
}

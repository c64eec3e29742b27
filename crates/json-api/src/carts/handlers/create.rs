//! Create Cart Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, prelude::*};

use emporium_app::domain::carts::records::CartOwner;

use crate::{
    carts::{errors::into_status_error, responses::CartResponse},
    extensions::*,
    state::State,
};

/// Create Cart Handler
///
/// Returns the caller's live cart, creating it if they have none.
#[endpoint(
    tags("carts"),
    summary = "Get or Create Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Live cart"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let cart = state
        .app
        .carts
        .get_or_create_cart(CartOwner::User(principal.user))
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/carts/{}", cart.uuid), true)
        .or_500("failed to set location header")?;

    Ok(Json(cart.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use emporium_app::domain::carts::{CartsServiceError, records::CartUuid};

    use crate::{
        carts::responses::fixtures::make_cart,
        test_helpers::{TEST_BUYER, TestServices, buyer_service},
    };

    use super::*;

    fn make_service(services: TestServices) -> Service {
        buyer_service(services, Router::with_path("carts").post(handler))
    }

    #[tokio::test]
    async fn returns_the_buyers_live_cart() -> TestResult {
        let uuid = CartUuid::new();
        let mut services = TestServices::default();

        services
            .carts
            .expect_get_or_create_cart()
            .once()
            .withf(|owner| *owner == CartOwner::User(TEST_BUYER.user))
            .return_once(move |_| Ok(make_cart(uuid, TEST_BUYER.user)));

        let mut res = TestClient::post("http://example.com/carts")
            .send(&make_service(services))
            .await;

        let body: CartResponse = res.take_json().await?;
        let location = res.headers().get(LOCATION).and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(location, Some(format!("/carts/{uuid}").as_str()));
        assert_eq!(body.uuid, uuid.into_uuid());
        assert!(body.items.is_empty(), "expected an empty cart");

        Ok(())
    }

    #[tokio::test]
    async fn storage_failure_returns_500() {
        let mut services = TestServices::default();

        services
            .carts
            .expect_get_or_create_cart()
            .once()
            .return_once(|_| Err(CartsServiceError::Sql(sqlx::Error::PoolTimedOut)));

        let res = TestClient::post("http://example.com/carts")
            .send(&make_service(services))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));
    }
}

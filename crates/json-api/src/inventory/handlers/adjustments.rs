//! List Adjustments Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{PathParam, QueryParam},
    prelude::*,
};
use uuid::Uuid;

use crate::{
    extensions::*,
    inventory::{errors::into_status_error, responses::AdjustmentResponse},
    state::State,
};

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 500;

/// List Adjustments Handler
///
/// Most recent stock adjustments for a product, newest first.
#[endpoint(
    tags("inventory"),
    summary = "List Adjustments",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Adjustment ledger"),
        (status_code = StatusCode::FORBIDDEN, description = "Operator role required"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    limit: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<Vec<AdjustmentResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    depot.operator_or_403()?;

    let limit = limit.into_inner().unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let adjustments = state
        .app
        .inventory
        .list_adjustments(product.into_inner().into(), limit)
        .await
        .map_err(into_status_error)?;

    Ok(Json(
        adjustments
            .into_iter()
            .map(AdjustmentResponse::from)
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use emporium_app::domain::{
        inventory::records::{AdjustmentReason, AdjustmentRecord, AdjustmentUuid},
        products::records::ProductUuid,
    };

    use crate::test_helpers::{TestServices, operator_service};

    use super::*;

    fn route() -> Router {
        Router::with_path("inventory/{product}/adjustments").get(handler)
    }

    #[tokio::test]
    async fn lists_ledger_with_clamped_limit() -> TestResult {
        let product = ProductUuid::new();
        let mut services = TestServices::default();

        services
            .inventory
            .expect_list_adjustments()
            .once()
            .withf(move |uuid, limit| *uuid == product && *limit == MAX_LIMIT)
            .return_once(move |_, _| {
                Ok(vec![AdjustmentRecord {
                    uuid: AdjustmentUuid::new(),
                    product_uuid: product,
                    delta: -2,
                    reason: AdjustmentReason::Damage,
                    note: Some("crushed in transit".to_string()),
                    quantity_after: 8,
                    created_at: Timestamp::now(),
                }])
            });

        let mut res = TestClient::get(format!(
            "http://example.com/inventory/{product}/adjustments?limit=10000"
        ))
        .send(&operator_service(services, route()))
        .await;

        let body: Vec<AdjustmentResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.len(), 1);

        let adjustment = body.first().ok_or("missing adjustment")?;

        assert_eq!(adjustment.reason, "damage");
        assert_eq!(adjustment.quantity_after, 8);

        Ok(())
    }
}

//! Errors

use salvo::http::StatusError;
use tracing::error;

use emporium_app::domain::inventory::InventoryServiceError;

pub(crate) fn into_status_error(error: InventoryServiceError) -> StatusError {
    match error {
        InventoryServiceError::NotFound => {
            StatusError::not_found().brief("Inventory record not found")
        }
        InventoryServiceError::InvalidReference => {
            StatusError::not_found().brief("Product not found")
        }
        InventoryServiceError::AlreadyExists => {
            StatusError::conflict().brief("Inventory record already exists")
        }
        error @ (InventoryServiceError::InsufficientStock { .. }
        | InventoryServiceError::AdjustmentBelowReserved { .. }) => {
            StatusError::conflict().brief(error.to_string())
        }
        error @ InventoryServiceError::InvalidAdjustment(_) => {
            StatusError::bad_request().brief(error.to_string())
        }
        InventoryServiceError::Sql(source) => {
            error!("inventory storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use emporium_app::domain::products::records::ProductUuid;

    use super::*;

    #[test]
    fn adjustment_below_reserved_is_a_conflict() {
        let status = into_status_error(InventoryServiceError::AdjustmentBelowReserved {
            product: ProductUuid::new(),
            delta: -5,
            quantity: 2,
            reserved: 3,
        });

        assert_eq!(status.code, StatusCode::CONFLICT);
    }

    #[test]
    fn zero_delta_is_a_bad_request() {
        let status = into_status_error(InventoryServiceError::InvalidAdjustment(
            "delta must be non-zero",
        ));

        assert_eq!(status.code, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unknown_product_is_not_found() {
        let status = into_status_error(InventoryServiceError::InvalidReference);

        assert_eq!(status.code, StatusCode::NOT_FOUND);
    }
}

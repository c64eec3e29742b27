//! Errors

use salvo::http::StatusError;
use tracing::error;

use emporium_app::domain::carts::CartsServiceError;

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::AlreadyExists => StatusError::conflict().brief("Cart already exists"),
        CartsServiceError::NotFound => StatusError::not_found().brief("Cart or item not found"),
        CartsServiceError::UnknownProduct { product } => {
            StatusError::not_found().brief(format!("Product {product} not found"))
        }
        CartsServiceError::Validation(message) => StatusError::bad_request().brief(message),
        CartsServiceError::InvalidReference
        | CartsServiceError::MissingRequiredData
        | CartsServiceError::InvalidData
        | CartsServiceError::AmountOverflow => {
            StatusError::bad_request().brief("Invalid cart payload")
        }
        CartsServiceError::ProductUnavailable { product } => {
            StatusError::conflict().brief(format!("Product {product} is not available for sale"))
        }
        CartsServiceError::Sql(source) => {
            error!("cart storage error: {source}");

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
    fn unknown_product_is_distinguished_from_missing_cart() {
        let product = ProductUuid::new();

        let unknown = into_status_error(CartsServiceError::UnknownProduct { product });
        let missing = into_status_error(CartsServiceError::NotFound);

        assert_eq!(unknown.code, StatusCode::NOT_FOUND);
        assert_eq!(unknown.brief, format!("Product {product} not found"));
        assert_ne!(unknown.brief, missing.brief);
    }

    #[test]
    fn line_quantity_overflow_is_a_bad_request() {
        let status = into_status_error(CartsServiceError::Validation(
            "line quantity exceeds the maximum of 4294967295",
        ));

        assert_eq!(status.code, StatusCode::BAD_REQUEST);
    }
}

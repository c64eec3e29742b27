//! Errors

use salvo::http::StatusError;
use tracing::error;

use emporium_app::domain::orders::OrdersServiceError;

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::Validation(_) => StatusError::bad_request().brief(error.to_string()),
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::AlreadyExists
        | OrdersServiceError::EmptyCart
        | OrdersServiceError::ProductUnavailable { .. }
        | OrdersServiceError::PriceChanged { .. }
        | OrdersServiceError::InsufficientStock { .. }
        | OrdersServiceError::InvalidTransition { .. } => {
            StatusError::conflict().brief(error.to_string())
        }
        OrdersServiceError::Sql(ref source) => {
            error!(retryable = error.is_retryable(), "order storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}

/// Metric label for the result of an order placement.
pub(crate) fn placement_outcome(error: &OrdersServiceError) -> &'static str {
    match error {
        OrdersServiceError::Validation(_) => "invalid",
        OrdersServiceError::NotFound => "cart_not_found",
        OrdersServiceError::AlreadyExists => "duplicate",
        OrdersServiceError::EmptyCart => "empty_cart",
        OrdersServiceError::ProductUnavailable { .. } => "product_unavailable",
        OrdersServiceError::PriceChanged { .. } => "price_changed",
        OrdersServiceError::InsufficientStock { .. } => "insufficient_stock",
        OrdersServiceError::InvalidTransition { .. } => "invalid_transition",
        OrdersServiceError::Sql(_) => "storage_error",
    }
}

//! App Router

use salvo::Router;

use crate::{auth, carts, inventory, orders};

/// Every authenticated route.
///
/// Literal segments (`carts/merge`, `orders/statistics`) are pushed ahead of
/// their `{uuid}` siblings so they are matched first.
pub fn app_router() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(carts_router())
        .push(orders_router())
        .push(inventory_router())
}

fn carts_router() -> Router {
    Router::with_path("carts")
        .post(carts::create::handler)
        .push(Router::with_path("merge").post(carts::merge::handler))
        .push(
            Router::with_path("{cart}")
                .get(carts::get::handler)
                .push(Router::with_path("snapshot").get(carts::snapshot::handler))
                .push(
                    Router::with_path("items")
                        .post(carts::items::create::handler)
                        .delete(carts::items::clear::handler)
                        .push(
                            Router::with_path("{item}")
                                .put(carts::items::update::handler)
                                .delete(carts::items::delete::handler),
                        ),
                ),
        )
}

fn orders_router() -> Router {
    Router::with_path("orders")
        .get(orders::index::handler)
        .post(orders::create::handler)
        .push(Router::with_path("statistics").get(orders::statistics::handler))
        .push(
            Router::with_path("{order}")
                .get(orders::get::handler)
                .push(Router::with_path("cancel").post(orders::cancel::handler))
                .push(Router::with_path("status").put(orders::status::handler)),
        )
}

fn inventory_router() -> Router {
    Router::with_path("inventory/{product}")
        .get(inventory::get::handler)
        .push(
            Router::with_path("adjustments")
                .get(inventory::adjustments::handler)
                .post(inventory::adjust::handler),
        )
}

//! Test helpers.

use std::sync::Arc;

use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use emporium_app::{
    auth::{MockAuthService, Principal, Role},
    context::AppContext,
    domain::{
        carts::MockCartsService, inventory::MockInventoryService, orders::MockOrdersService,
        users::UserUuid,
    },
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_BUYER: Principal = Principal {
    user: UserUuid::from_uuid(Uuid::from_u128(1)),
    role: Role::Buyer,
};

pub(crate) const TEST_OPERATOR: Principal = Principal {
    user: UserUuid::from_uuid(Uuid::from_u128(2)),
    role: Role::Operator,
};

/// Mocks backing a test [`State`]. Any call without a matching expectation fails the test.
#[derive(Default)]
pub(crate) struct TestServices {
    pub(crate) carts: MockCartsService,
    pub(crate) inventory: MockInventoryService,
    pub(crate) orders: MockOrdersService,
    pub(crate) auth: MockAuthService,
}

pub(crate) fn state_with(services: TestServices) -> Arc<State> {
    State::from_app_context(AppContext {
        carts: Arc::new(services.carts),
        inventory: Arc::new(services.inventory),
        orders: Arc::new(services.orders),
        auth: Arc::new(services.auth),
    })
}

#[salvo::handler]
async fn inject_buyer(req: &mut Request, depot: &mut Depot, res: &mut Response, ctrl: &mut FlowCtrl) {
    depot.insert_principal(TEST_BUYER);
    ctrl.call_next(req, depot, res).await;
}

#[salvo::handler]
async fn inject_operator(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_principal(TEST_OPERATOR);
    ctrl.call_next(req, depot, res).await;
}

/// Serve `route` as [`TEST_BUYER`].
pub(crate) fn buyer_service(services: TestServices, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with(services)))
            .hoop(inject_buyer)
            .push(route),
    )
}

/// Serve `route` as [`TEST_OPERATOR`].
pub(crate) fn operator_service(services: TestServices, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with(services)))
            .hoop(inject_operator)
            .push(route),
    )
}

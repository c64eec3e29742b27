//! Cart Repositories

mod carts;
mod items;
mod snapshot;

pub(crate) use carts::PgCartsRepository;
pub(crate) use items::PgCartItemsRepository;
pub(crate) use snapshot::PgCartSnapshotReader;

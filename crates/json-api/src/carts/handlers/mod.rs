//! Cart Handlers

pub(crate) mod create;
pub(crate) mod get;
pub(crate) mod merge;
pub(crate) mod snapshot;

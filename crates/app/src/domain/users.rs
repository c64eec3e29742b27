//! Users
//!
//! Accounts live outside this service; only their identifiers are stored.

use crate::uuids::TypedUuid;

/// Marker for identifiers of registered buyers and operators.
#[derive(Debug)]
pub struct User;

/// User UUID
pub type UserUuid = TypedUuid<User>;

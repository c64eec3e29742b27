//! Emporium Domain Concerns

pub mod carts;
pub mod inventory;
pub mod orders;
pub mod pricing;
pub mod products;
pub mod users;

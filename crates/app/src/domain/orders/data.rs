//! Order Data

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    carts::records::CartUuid,
    orders::{address::Address, records::OrderUuid, status::OrderStatus},
};

/// Maximum length of free-text notes on an order.
pub const MAX_NOTES_LEN: usize = 1000;

/// Maximum length of a payment method label.
pub const MAX_PAYMENT_METHOD_LEN: usize = 64;

/// Largest page a listing will return.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A request to convert a cart into an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Chosen by the caller. Placing the same order twice fails with
    /// `AlreadyExists` instead of creating a second order.
    pub uuid: OrderUuid,
    pub cart: CartUuid,
    pub shipping_address: Address,

    /// Defaults to the shipping address.
    pub billing_address: Option<Address>,

    pub payment_method: String,
    pub notes: Option<String>,
}

/// Operator-driven status change.
#[derive(Debug, Clone)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,

    /// Replaces the order's notes when present.
    pub notes: Option<String>,

    pub tracking_number: Option<String>,
    pub payment_reference: Option<String>,
}

impl OrderStatusUpdate {
    #[must_use]
    pub fn to(status: OrderStatus) -> Self {
        Self {
            status,
            notes: None,
            tracking_number: None,
            payment_reference: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Total,
}

impl OrderSortField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Total => "total",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown sort option: {0}")]
pub struct UnknownSortOption(pub String);

impl FromStr for OrderSortField {
    type Err = UnknownSortOption;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            "total" => Ok(Self::Total),
            other => Err(UnknownSortOption(other.to_string())),
        }
    }
}

impl FromStr for SortDirection {
    type Err = UnknownSortOption;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(UnknownSortOption(other.to_string())),
        }
    }
}

impl fmt::Display for OrderSortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters, ordering and pagination for an order listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,

    /// Case-insensitive match against the order id or notes.
    pub search: Option<String>,

    pub sort_by: OrderSortField,
    pub direction: SortDirection,

    /// 1-based.
    pub page: u32,

    pub page_size: u32,
}

impl Default for OrderListQuery {
    fn default() -> Self {
        Self {
            status: None,
            search: None,
            sort_by: OrderSortField::default(),
            direction: SortDirection::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl OrderListQuery {
    /// # Errors
    ///
    /// Returns a description of the first out-of-range parameter.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.page == 0 {
            return Err("page must be at least 1");
        }

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err("page_size must be between 1 and 100");
        }

        Ok(())
    }

    pub(crate) fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// The trimmed search term with `LIKE` wildcards escaped, if any.
    pub(crate) fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref()?.trim();

        if term.is_empty() {
            return None;
        }

        let mut escaped = String::with_capacity(term.len());

        for c in term.chars() {
            if matches!(c, '%' | '_' | '\\') {
                escaped.push('\\');
            }

            escaped.push(c);
        }

        Some(escaped)
    }
}

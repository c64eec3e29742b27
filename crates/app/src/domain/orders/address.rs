//! Order Addresses

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A postal address copied onto an order at placement time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,

    /// ISO 3166-1 alpha-2 country code.
    pub country: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address field `{0}` is required")]
    MissingField(&'static str),

    #[error("country must be a two-letter ISO code, got `{0}`")]
    InvalidCountry(String),
}

impl Address {
    /// Check that every required field is present.
    ///
    /// # Errors
    ///
    /// Returns the first blank required field, or [`AddressError::InvalidCountry`].
    pub fn validate(&self) -> Result<(), AddressError> {
        let required = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("address_line1", &self.address_line1),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ];

        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(AddressError::MissingField(field));
        }

        let country = self.country.trim();

        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AddressError::InvalidCountry(self.country.clone()));
        }

        Ok(())
    }

    /// The address with surrounding whitespace trimmed and the country upper-cased.
    #[must_use]
    pub fn normalized(self) -> Self {
        fn trim(value: String) -> String {
            value.trim().to_string()
        }

        fn trim_optional(value: Option<String>) -> Option<String> {
            value.map(trim).filter(|value| !value.is_empty())
        }

        Self {
            first_name: trim(self.first_name),
            last_name: trim(self.last_name),
            company: trim_optional(self.company),
            address_line1: trim(self.address_line1),
            address_line2: trim_optional(self.address_line2),
            city: trim(self.city),
            state: trim(self.state),
            postal_code: trim(self.postal_code),
            country: self.country.trim().to_ascii_uppercase(),
            phone: trim_optional(self.phone),
        }
    }
}

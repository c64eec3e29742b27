//! Auth data models.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{auth::AuthServiceError, domain::users::UserUuid, uuids::TypedUuid};

/// API token UUID
pub type ApiTokenUuid = TypedUuid<ApiTokenRecord>;

/// What a token holder may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Manages their own carts and orders.
    Buyer,

    /// Moves any order through fulfilment and adjusts stock.
    Operator,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Operator => "operator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "buyer" => Ok(Self::Buyer),
            "operator" => Ok(Self::Operator),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user: UserUuid,
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub const fn is_operator(&self) -> bool {
        matches!(self.role, Role::Operator)
    }

    /// # Errors
    ///
    /// Returns [`AuthServiceError::Forbidden`] unless the caller is an operator.
    pub fn require_operator(&self) -> Result<(), AuthServiceError> {
        if self.is_operator() {
            Ok(())
        } else {
            Err(AuthServiceError::Forbidden)
        }
    }
}

/// API token metadata persisted in storage. The secret is never stored.
#[derive(Debug, Clone)]
pub struct ApiTokenRecord {
    pub uuid: ApiTokenUuid,
    pub user: UserUuid,
    pub role: Role,
    pub created_at: Timestamp,
    pub last_used_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
}

impl ApiTokenRecord {
    #[must_use]
    pub fn principal(&self) -> Principal {
        Principal {
            user: self.user,
            role: self.role,
        }
    }
}

/// New API token persistence payload.
#[derive(Debug, Clone)]
pub(crate) struct NewApiToken {
    pub uuid: ApiTokenUuid,
    pub user: UserUuid,
    pub role: Role,
    pub token_hash: String,
}

/// API token issuance result with one-time raw token.
#[derive(Debug, Clone)]
pub struct IssuedApiToken {
    pub token: String,
    pub record: ApiTokenRecord,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn roles_parse_from_storage_names() -> TestResult {
        assert_eq!("buyer".parse::<Role>()?, Role::Buyer);
        assert_eq!("operator".parse::<Role>()?, Role::Operator);
        assert!("admin".parse::<Role>().is_err());

        Ok(())
    }

    #[test]
    fn only_operators_pass_the_operator_check() {
        let buyer = Principal {
            user: UserUuid::new(),
            role: Role::Buyer,
        };
        let operator = Principal {
            role: Role::Operator,
            ..buyer
        };

        assert!(matches!(
            buyer.require_operator(),
            Err(AuthServiceError::Forbidden)
        ));
        assert!(operator.require_operator().is_ok());
    }
}

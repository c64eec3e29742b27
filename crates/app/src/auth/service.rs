//! Auth service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::{
    auth::{
        ApiTokenRecord, ApiTokenUuid, AuthServiceError, IssuedApiToken, NewApiToken, Principal,
        Role, format_api_token, generate_api_token_secret, hash_api_token, parse_api_token,
        repository::PgAuthRepository,
    },
    domain::users::UserUuid,
};

#[derive(Debug, Clone)]
pub struct PgAuthService {
    repository: PgAuthRepository,
}

impl PgAuthService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PgAuthRepository::new(pool),
        }
    }

    /// Issue a new API token for `user` acting as `role`.
    ///
    /// The raw token is only ever returned here.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insertion fails.
    #[tracing::instrument(name = "auth.service.issue_api_token", skip(self), err)]
    pub async fn issue_api_token(
        &self,
        user: UserUuid,
        role: Role,
    ) -> Result<IssuedApiToken, AuthServiceError> {
        let secret = generate_api_token_secret();
        let token = format_api_token(&secret);

        let record = self
            .repository
            .create_api_token(&NewApiToken {
                uuid: ApiTokenUuid::new(),
                user,
                role,
                token_hash: hash_api_token(&secret),
            })
            .await?;

        info!(token_uuid = %record.uuid, "issued api token");

        Ok(IssuedApiToken { token, record })
    }

    /// List all tokens for `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_api_tokens(
        &self,
        user: UserUuid,
    ) -> Result<Vec<ApiTokenRecord>, AuthServiceError> {
        Ok(self.repository.list_api_tokens_by_user(user).await?)
    }

    /// Revoke a token by UUID. Returns `true` if the token was active.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    #[tracing::instrument(name = "auth.service.revoke_api_token", skip(self), err)]
    pub async fn revoke_api_token(&self, token: ApiTokenUuid) -> Result<bool, AuthServiceError> {
        Ok(self.repository.revoke_api_token(token).await?.is_some())
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError> {
        let secret = parse_api_token(bearer_token).map_err(|_| AuthServiceError::Unauthorized)?;

        let token = self
            .repository
            .find_active_api_token_by_hash(&hash_api_token(&secret))
            .await?
            .ok_or(AuthServiceError::Unauthorized)?;

        if let Err(error) = self.repository.touch_api_token_last_used(token.uuid).await {
            warn!(token_uuid = %token.uuid, %error, "failed to record token use");
        }

        Ok(token.principal())
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a bearer token to the caller it was issued to.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    async fn issued_token_authenticates_as_its_user_and_role() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();

        let issued = ctx.auth.issue_api_token(user, Role::Operator).await?;
        let principal = ctx.auth.authenticate_bearer(&issued.token).await?;

        assert_eq!(principal, Principal { user, role: Role::Operator });

        let tokens = ctx.auth.list_api_tokens(user).await?;

        assert_eq!(tokens.len(), 1);
        assert!(tokens.iter().all(|token| token.last_used_at.is_some()));

        Ok(())
    }

    #[tokio::test]
    async fn revoked_token_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let issued = ctx.auth.issue_api_token(UserUuid::new(), Role::Buyer).await?;

        assert!(ctx.auth.revoke_api_token(issued.record.uuid).await?);
        assert!(!ctx.auth.revoke_api_token(issued.record.uuid).await?);

        let result = ctx.auth.authenticate_bearer(&issued.token).await;

        assert!(
            matches!(result, Err(AuthServiceError::Unauthorized)),
            "expected Unauthorized, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn unknown_or_malformed_tokens_are_rejected() {
        let ctx = TestContext::new().await;
        let unknown = format_api_token(&generate_api_token_secret());

        for token in ["", "Bearer nope", unknown.as_str()] {
            let result = ctx.auth.authenticate_bearer(token).await;

            assert!(
                matches!(result, Err(AuthServiceError::Unauthorized)),
                "expected Unauthorized for {token:?}, got {result:?}"
            );
        }
    }
}

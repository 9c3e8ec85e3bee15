use crate::telemetry::error_chain_fmt;
use axum::http::HeaderMap;
use secrecy::{ExposeSecret, Secret};
use sqlx::PgPool;

/// The authenticated caller's user id, attached to the request as an
/// extension once the identity resolver has accepted the credentials.
#[derive(Copy, Clone, Debug)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(thiserror::Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingCredentials,
    #[error("Authentication failed")]
    InvalidCredentials,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Resolves request credentials to a user identity.
///
/// The privileged surface depends on this trait only, so the credential
/// scheme can change (API key today, sessions or OAuth tomorrow) without
/// touching any handler.
#[async_trait::async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> Result<UserId, AuthError>;
}

/// Bearer API key resolver backed by a single configured admin key.
///
/// A valid key resolves to the first active admin user on record, so writes
/// still carry a real author id.
pub struct ApiKeyIdentityResolver {
    api_key: Secret<String>,
    pool: PgPool,
}

impl ApiKeyIdentityResolver {
    pub fn new(api_key: Secret<String>, pool: PgPool) -> Self {
        Self { api_key, pool }
    }
}

#[async_trait::async_trait]
impl IdentityResolver for ApiKeyIdentityResolver {
    #[tracing::instrument(name = "Resolve API key identity", skip_all)]
    async fn resolve(&self, headers: &HeaderMap) -> Result<UserId, AuthError> {
        let header_value = headers
            .get("Authorization")
            .ok_or(AuthError::MissingCredentials)?
            .to_str()
            .map_err(|_| AuthError::InvalidCredentials)?;
        let provided_key = header_value
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidCredentials)?;

        if provided_key != self.api_key.expose_secret() {
            return Err(AuthError::InvalidCredentials);
        }

        let user_id: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM users WHERE is_admin AND is_active ORDER BY id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow::anyhow!(e).context("Failed to look up the admin user."))?;

        match user_id {
            Some(id) => Ok(UserId(id)),
            // A valid key with no admin row behind it cannot act.
            None => Err(AuthError::InvalidCredentials),
        }
    }
}

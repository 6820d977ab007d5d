//! Session & role guard.
//!
//! Resolves the caller's identity from an opaque session token and checks
//! the resolved role against the requirement. Invoked before every
//! privileged read or write; decisions are never cached across requests,
//! so a revoked session or demoted role takes effect on the next call.

use std::sync::Arc;

use async_trait::async_trait;
use forkline_types::{ForklineError, Identity, Result, Role};
use thiserror::Error;

/// An authenticated session as issued by the identity provider.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque bearer token the client presents on subsequent requests.
    pub token: String,
    pub identity: Identity,
}

/// Failure categories the identity provider can report.
///
/// The HTTP layer maps these to stable user-facing messages; provider
/// internals (raw upstream strings) stay in the logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// Bad email/password pair. Deliberately a single category — callers
    /// must not learn whether the account exists.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("an account with this email already exists")]
    DuplicateAccount,
    #[error("password does not meet the minimum requirements")]
    WeakPassword,
    #[error("email address is malformed")]
    MalformedEmail,
    /// The provider itself throttled the request.
    #[error("provider rate limited")]
    ProviderRateLimited,
    /// The auth code was unknown or already exchanged.
    #[error("invalid or expired code")]
    InvalidCode,
    /// Transport-level provider failure.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// The identity provider boundary.
///
/// The real deployment backs this with the hosted auth service; tests and
/// local runs use [`crate::MemoryIdentityProvider`].
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a session token to an identity. `Ok(None)` means the token
    /// is unknown, expired, or revoked.
    async fn resolve(&self, token: &str) -> Result<Option<Identity>>;

    /// Authenticate with credentials, minting a new session.
    async fn login(&self, email: &str, password: &str)
    -> std::result::Result<Session, CredentialError>;

    /// Register a new customer account, minting a new session.
    async fn signup(&self, email: &str, password: &str)
    -> std::result::Result<Session, CredentialError>;

    /// Exchange a one-shot authorization code for a session.
    async fn exchange_code(&self, code: &str) -> std::result::Result<Session, CredentialError>;
}

/// Gate for every privileged operation.
#[derive(Clone)]
pub struct SessionGuard {
    provider: Arc<dyn IdentityProvider>,
}

impl SessionGuard {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Resolve the caller. A missing token and an unresolvable token fail
    /// identically (`FL_ERR_100`); only a provider transport failure is
    /// reported differently, as an upstream error.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Identity> {
        let Some(token) = token else {
            return Err(ForklineError::Unauthorized);
        };
        match self.provider.resolve(token).await? {
            Some(identity) => Ok(identity),
            None => Err(ForklineError::Unauthorized),
        }
    }

    /// Succeeds only if the resolved role equals the required role.
    pub fn require_role(identity: &Identity, required: Role) -> Result<()> {
        if identity.role == required {
            Ok(())
        } else {
            Err(ForklineError::Forbidden { required })
        }
    }

    /// Authenticate and require a role in one step.
    pub async fn authenticate_role(&self, token: Option<&str>, required: Role) -> Result<Identity> {
        let identity = self.authenticate(token).await?;
        Self::require_role(&identity, required)?;
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryIdentityProvider;
    use forkline_types::UserId;

    fn guard_with_admin() -> (SessionGuard, Session) {
        let provider = Arc::new(MemoryIdentityProvider::new());
        let session = provider.seed_user("ops@forkline.test", "hunter2hunter2", Role::Admin);
        (SessionGuard::new(provider), session)
    }

    #[tokio::test]
    async fn missing_and_bogus_tokens_fail_identically() {
        let (guard, _) = guard_with_admin();
        let missing = guard.authenticate(None).await.unwrap_err();
        let bogus = guard.authenticate(Some("not-a-token")).await.unwrap_err();
        assert_eq!(format!("{missing}"), format!("{bogus}"));
        assert!(matches!(missing, ForklineError::Unauthorized));
    }

    #[tokio::test]
    async fn valid_token_resolves_identity() {
        let (guard, session) = guard_with_admin();
        let identity = guard.authenticate(Some(&session.token)).await.unwrap();
        assert_eq!(identity.role, Role::Admin);
        assert_eq!(identity, session.identity);
    }

    #[tokio::test]
    async fn wrong_role_is_forbidden() {
        let provider = Arc::new(MemoryIdentityProvider::new());
        let session = provider.seed_user("eve@forkline.test", "hunter2hunter2", Role::Customer);
        let guard = SessionGuard::new(provider);
        let err = guard
            .authenticate_role(Some(&session.token), Role::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, ForklineError::Forbidden { required: Role::Admin }));
    }

    #[test]
    fn role_check_is_equality_not_hierarchy() {
        let admin = Identity {
            user_id: UserId::new(),
            role: Role::Admin,
            email: "ops@forkline.test".into(),
        };
        assert!(SessionGuard::require_role(&admin, Role::Customer).is_err());
        assert!(SessionGuard::require_role(&admin, Role::Admin).is_ok());
    }
}

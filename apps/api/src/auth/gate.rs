//! The authorization decision consumed by every protected route.

use std::fmt;

use thiserror::Error;
use tracing::warn;

use crate::auth::identity::IdentityResolver;
use crate::auth::store::StoreError;
use crate::models::user::User;

/// Account-state condition a route requires beyond a valid identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any resolved identity.
    None,
    Active,
    Verified,
}

impl Requirement {
    pub fn is_satisfied_by(self, user: &User) -> bool {
        match self {
            Requirement::None => true,
            Requirement::Active => user.is_active,
            Requirement::Verified => user.is_verified,
        }
    }

    pub fn rejection_message(self) -> &'static str {
        match self {
            Requirement::None => "Access denied",
            Requirement::Active => "Inactive user",
            Requirement::Verified => "Unverified user",
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Requirement::None => "none",
            Requirement::Active => "active",
            Requirement::Verified => "verified",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// No valid identity: missing, malformed, expired or forged token, or the
    /// token's account no longer exists.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Valid identity whose account state fails the requirement.
    #[error("account does not satisfy requirement '{0}'")]
    Forbidden(Requirement),

    /// The account store could not answer. The request is denied.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Identity resolution plus live account-state checks.
///
/// Nothing is cached between calls: an account deactivated mid-session is
/// refused on its next request even though its token is still unexpired.
#[derive(Clone)]
pub struct AccessGate {
    resolver: IdentityResolver,
}

impl AccessGate {
    pub fn new(resolver: IdentityResolver) -> Self {
        Self { resolver }
    }

    pub async fn authorize(&self, token: &str, requirement: Requirement) -> Result<User, AuthError> {
        let user = self.resolver.resolve(token).await?;

        if !requirement.is_satisfied_by(&user) {
            warn!(
                "Account {} refused: requirement '{}' not met",
                user.id, requirement
            );
            return Err(AuthError::Forbidden(requirement));
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use super::*;
    use crate::auth::store::memory::{InMemoryUserStore, UnavailableUserStore};
    use crate::auth::store::{StoreError, UserStore};
    use crate::auth::test_support::sample_user;
    use crate::auth::token::{test_auth_config, TokenService};

    fn setup() -> (AccessGate, Arc<TokenService>, Arc<InMemoryUserStore>) {
        let tokens = Arc::new(TokenService::new(&test_auth_config()));
        let store = Arc::new(InMemoryUserStore::default());
        let gate = AccessGate::new(IdentityResolver::new(tokens.clone(), store.clone()));
        (gate, tokens, store)
    }

    #[tokio::test]
    async fn test_active_account_passes_every_requirement() {
        let (gate, tokens, store) = setup();
        let user = sample_user("a@x.com");
        store.insert(&user).await.unwrap();
        let token = tokens.issue(&user.id, Duration::minutes(5)).unwrap();

        for req in [Requirement::None, Requirement::Active, Requirement::Verified] {
            let authorized = gate.authorize(&token, req).await.unwrap();
            assert_eq!(authorized.id, user.id);
        }
    }

    #[tokio::test]
    async fn test_deactivated_account_is_forbidden_not_unauthenticated() {
        let (gate, tokens, store) = setup();
        let mut user = sample_user("a@x.com");
        store.insert(&user).await.unwrap();
        let token = tokens.issue(&user.id, Duration::minutes(5)).unwrap();

        assert!(gate.authorize(&token, Requirement::Active).await.is_ok());

        // Deactivate mid-session; the same unexpired token is refused next call.
        user.is_active = false;
        store.update(&user).await.unwrap();

        assert!(matches!(
            gate.authorize(&token, Requirement::Active).await,
            Err(AuthError::Forbidden(Requirement::Active))
        ));
        assert!(gate.authorize(&token, Requirement::None).await.is_ok());
    }

    #[tokio::test]
    async fn test_unverified_account_is_forbidden_for_verified_routes() {
        let (gate, tokens, store) = setup();
        let mut user = sample_user("a@x.com");
        user.is_verified = false;
        store.insert(&user).await.unwrap();
        let token = tokens.issue(&user.id, Duration::minutes(5)).unwrap();

        assert!(matches!(
            gate.authorize(&token, Requirement::Verified).await,
            Err(AuthError::Forbidden(Requirement::Verified))
        ));
        assert!(gate.authorize(&token, Requirement::Active).await.is_ok());
    }

    #[tokio::test]
    async fn test_deleted_account_is_unauthenticated() {
        let (gate, tokens, store) = setup();
        let user = sample_user("a@x.com");
        store.insert(&user).await.unwrap();
        let token = tokens.issue(&user.id, Duration::minutes(5)).unwrap();

        store.remove(&user.id);

        assert!(matches!(
            gate.authorize(&token, Requirement::Active).await,
            Err(AuthError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_invalid_token_short_circuits_before_requirement() {
        let (gate, tokens, store) = setup();
        let mut user = sample_user("a@x.com");
        user.is_active = false;
        store.insert(&user).await.unwrap();
        let expired = tokens
            .issue_at(&user.id, Duration::minutes(1), Utc::now() - Duration::minutes(10))
            .unwrap();

        assert!(matches!(
            gate.authorize(&expired, Requirement::Active).await,
            Err(AuthError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_store_failure_never_authorizes() {
        let tokens = Arc::new(TokenService::new(&test_auth_config()));
        let gate = AccessGate::new(IdentityResolver::new(
            tokens.clone(),
            Arc::new(UnavailableUserStore),
        ));
        let token = tokens.issue("user-123", Duration::minutes(5)).unwrap();

        for req in [Requirement::None, Requirement::Active, Requirement::Verified] {
            assert!(matches!(
                gate.authorize(&token, req).await,
                Err(AuthError::Store(StoreError::Database(_)))
            ));
        }
    }

    #[test]
    fn test_requirement_messages() {
        assert_eq!(Requirement::Active.rejection_message(), "Inactive user");
        assert_eq!(Requirement::Verified.to_string(), "verified");
    }
}

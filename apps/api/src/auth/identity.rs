use std::sync::Arc;

use tracing::debug;

use crate::auth::gate::AuthError;
use crate::auth::store::UserStore;
use crate::auth::token::TokenService;
use crate::models::user::User;

/// Turns a bearer token into the live account it names.
///
/// Tokens carry no account snapshot, so the account is read from the store on
/// every call. A deleted account stops authenticating immediately.
#[derive(Clone)]
pub struct IdentityResolver {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserStore>,
}

impl IdentityResolver {
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserStore>) -> Self {
        Self { tokens, users }
    }

    pub async fn resolve(&self, token: &str) -> Result<User, AuthError> {
        let verified = self.tokens.verify(token).map_err(|_| {
            debug!("Rejected bearer token: failed verification");
            AuthError::Unauthenticated
        })?;

        match self.users.find_by_id(&verified.subject).await? {
            Some(user) => Ok(user),
            None => {
                debug!("Rejected bearer token: account {} not found", verified.subject);
                Err(AuthError::Unauthenticated)
            }
        }
    }
}

//! Authentication and authorization core.
//!
//! Components, leaves first:
//! - `password`: Argon2id hashing of credentials
//! - `token`: signed, time-limited bearer tokens
//! - `identity`: bearer token → live account
//! - `gate`: identity plus account-state requirement → authorization decision
//!
//! `extract` exposes the gate to handlers as axum extractors.

pub mod extract;
pub mod gate;
pub mod handlers;
pub mod identity;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

pub use extract::{ActiveUser, CurrentUser, VerifiedUser};
pub use gate::{AccessGate, AuthError, Requirement};
pub use identity::IdentityResolver;
pub use password::PasswordService;
pub use store::{PgUserStore, StoreError, UserStore};
pub use token::TokenService;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::models::user::User;

    pub fn sample_user(email: &str) -> User {
        User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            hashed_password: "$argon2id$placeholder".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            phone: None,
            subscription_status: "free".to_string(),
            subscription_end_date: None,
            is_active: true,
            is_verified: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

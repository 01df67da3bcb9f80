//! Registration and login: the two places a plaintext password is accepted.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::PasswordService;
use crate::auth::store::{StoreError, UserStore};
use crate::auth::token::TokenService;
use crate::errors::AppError;
use crate::models::user::User;
use crate::validation::{require_non_empty, validate_email, validate_password};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

/// OAuth2 password-grant form. `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Creates an account. The email must not already be registered.
pub async fn register(
    users: &dyn UserStore,
    passwords: &PasswordService,
    req: RegisterRequest,
    auto_verify: bool,
) -> Result<User, AppError> {
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    require_non_empty("first_name", &req.first_name)?;
    require_non_empty("last_name", &req.last_name)?;

    if users.find_by_email(&req.email).await?.is_some() {
        return Err(StoreError::DuplicateEmail.into());
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        email: req.email,
        hashed_password: passwords.hash(&req.password)?,
        first_name: req.first_name,
        last_name: req.last_name,
        phone: req.phone,
        subscription_status: "free".to_string(),
        subscription_end_date: None,
        is_active: true,
        is_verified: auto_verify,
        created_at: Utc::now(),
        updated_at: None,
    };

    // A concurrent registration can still win the race; the store reports it
    // as DuplicateEmail through the unique index.
    users.insert(&user).await?;
    info!("Registered account {}", user.id);
    Ok(user)
}

/// Checks credentials and issues an access token with the default lifetime.
pub async fn login(
    users: &dyn UserStore,
    passwords: &PasswordService,
    tokens: &TokenService,
    form: LoginForm,
) -> Result<TokenResponse, AppError> {
    let bad_credentials = || AppError::Unauthorized("Incorrect email or password".to_string());

    let Some(user) = users.find_by_email(&form.username).await? else {
        passwords.verify_missing(&form.password);
        return Err(bad_credentials());
    };

    if !passwords.verify(&form.password, &user.hashed_password) {
        warn!("Failed login for account {}", user.id);
        return Err(bad_credentials());
    }

    if !user.is_active {
        return Err(AppError::Validation("Inactive user".to_string()));
    }

    let access_token = tokens
        .issue_default(&user.id)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;

    info!("Issued access token for account {}", user.id);
    Ok(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    })
}

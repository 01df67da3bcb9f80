use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::{ActiveUser, StoreError};
use crate::errors::AppError;
use crate::models::user::{User, UserResponse};
use crate::state::AppState;
use crate::validation::{require_non_empty, validate_email};

#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

fn apply_update(mut user: User, patch: UserUpdate) -> Result<User, AppError> {
    if let Some(email) = patch.email {
        validate_email(&email)?;
        user.email = email;
    }
    if let Some(v) = patch.first_name {
        require_non_empty("first_name", &v)?;
        user.first_name = v;
    }
    if let Some(v) = patch.last_name {
        require_non_empty("last_name", &v)?;
        user.last_name = v;
    }
    if patch.phone.is_some() {
        user.phone = patch.phone;
    }
    user.updated_at = Some(Utc::now());
    Ok(user)
}

/// GET /api/v1/users/me
pub async fn handle_me(ActiveUser(user): ActiveUser) -> Json<UserResponse> {
    Json(user.into())
}

/// PUT /api/v1/users/me
pub async fn handle_update_me(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Json(patch): Json<UserUpdate>,
) -> Result<Json<UserResponse>, AppError> {
    if let Some(email) = patch.email.as_deref() {
        if email != user.email && state.users.find_by_email(email).await?.is_some() {
            return Err(StoreError::DuplicateEmail.into());
        }
    }

    let updated = apply_update(user, patch)?;
    state.users.update(&updated).await?;
    Ok(Json(updated.into()))
}

use axum::{extract::State, Form, Json};

use crate::auth::service::{self, LoginForm, RegisterRequest, TokenResponse};
use crate::errors::AppError;
use crate::models::user::UserResponse;
use crate::state::AppState;

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = service::register(
        state.users.as_ref(),
        &state.passwords,
        req,
        state.config.auto_verify_accounts,
    )
    .await?;
    Ok(Json(user.into()))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = service::login(state.users.as_ref(), &state.passwords, &state.tokens, form).await?;
    Ok(Json(token))
}

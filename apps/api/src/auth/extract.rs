//! Axum extractors that run the access gate on the `Authorization` header.
//!
//! Handlers declare the account state they need by argument type:
//! `CurrentUser` (any identity), `ActiveUser`, `VerifiedUser`.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::auth::gate::{AuthError, Requirement};
use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[derive(Debug, Clone)]
pub struct ActiveUser(pub User);

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct VerifiedUser(pub User);

/// Returns the token of an `Authorization: Bearer <token>` header, if any.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

async fn authorize_parts(
    parts: &Parts,
    state: &AppState,
    requirement: Requirement,
) -> Result<User, AppError> {
    let token = bearer_token(parts).ok_or(AuthError::Unauthenticated)?;
    Ok(state.gate.authorize(token, requirement).await?)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authorize_parts(parts, state, Requirement::None).await.map(Self)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for ActiveUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authorize_parts(parts, state, Requirement::Active).await.map(Self)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for VerifiedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authorize_parts(parts, state, Requirement::Verified).await.map(Self)
    }
}

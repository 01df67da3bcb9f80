use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::ActiveUser;
use crate::errors::AppError;
use crate::models::profile::ExperienceRow;
use crate::state::AppState;
use crate::validation::{require_non_empty, validate_date_range};

#[derive(Debug, Deserialize)]
pub struct ExperienceCreate {
    pub company_name: String,
    pub job_title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_current: bool,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExperienceUpdate {
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_current: Option<bool>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl ExperienceCreate {
    fn into_row(self, user_id: &str) -> Result<ExperienceRow, AppError> {
        let row = ExperienceRow {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            company_name: self.company_name,
            job_title: self.job_title,
            start_date: self.start_date,
            end_date: self.end_date,
            is_current: self.is_current,
            location: self.location,
            description: self.description,
            created_at: Utc::now(),
            updated_at: None,
        };
        validate(&row)?;
        Ok(row)
    }
}

/// Applies the fields present in `patch` and re-validates the result.
fn apply_update(mut row: ExperienceRow, patch: ExperienceUpdate) -> Result<ExperienceRow, AppError> {
    if let Some(v) = patch.company_name {
        row.company_name = v;
    }
    if let Some(v) = patch.job_title {
        row.job_title = v;
    }
    if let Some(v) = patch.start_date {
        row.start_date = v;
    }
    if patch.end_date.is_some() {
        row.end_date = patch.end_date;
    }
    if let Some(v) = patch.is_current {
        row.is_current = v;
    }
    if patch.location.is_some() {
        row.location = patch.location;
    }
    if patch.description.is_some() {
        row.description = patch.description;
    }
    row.updated_at = Some(Utc::now());
    validate(&row)?;
    Ok(row)
}

fn validate(row: &ExperienceRow) -> Result<(), AppError> {
    require_non_empty("company_name", &row.company_name)?;
    require_non_empty("job_title", &row.job_title)?;
    validate_date_range(row.start_date, row.end_date)?;
    Ok(())
}

async fn fetch_owned(state: &AppState, id: &str, user_id: &str) -> Result<ExperienceRow, AppError> {
    sqlx::query_as::<_, ExperienceRow>("SELECT * FROM experiences WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Experience not found".to_string()))
}

/// POST /api/v1/profile/experiences
pub async fn handle_create(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Json(req): Json<ExperienceCreate>,
) -> Result<Json<ExperienceRow>, AppError> {
    let row = req.into_row(&user.id)?;
    sqlx::query(
        r#"
        INSERT INTO experiences
            (id, user_id, company_name, job_title, start_date, end_date,
             is_current, location, description, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(&row.id)
    .bind(&row.user_id)
    .bind(&row.company_name)
    .bind(&row.job_title)
    .bind(row.start_date)
    .bind(row.end_date)
    .bind(row.is_current)
    .bind(&row.location)
    .bind(&row.description)
    .bind(row.created_at)
    .execute(&state.db)
    .await?;
    Ok(Json(row))
}

/// GET /api/v1/profile/experiences
pub async fn handle_list(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
) -> Result<Json<Vec<ExperienceRow>>, AppError> {
    let rows = sqlx::query_as::<_, ExperienceRow>(
        "SELECT * FROM experiences WHERE user_id = $1 ORDER BY start_date DESC",
    )
    .bind(&user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// GET /api/v1/profile/experiences/:id
pub async fn handle_get(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<String>,
) -> Result<Json<ExperienceRow>, AppError> {
    Ok(Json(fetch_owned(&state, &id, &user.id).await?))
}

/// PUT /api/v1/profile/experiences/:id
pub async fn handle_update(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<String>,
    Json(patch): Json<ExperienceUpdate>,
) -> Result<Json<ExperienceRow>, AppError> {
    let row = apply_update(fetch_owned(&state, &id, &user.id).await?, patch)?;
    sqlx::query(
        r#"
        UPDATE experiences SET
            company_name = $3, job_title = $4, start_date = $5, end_date = $6,
            is_current = $7, location = $8, description = $9, updated_at = $10
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(&row.id)
    .bind(&row.user_id)
    .bind(&row.company_name)
    .bind(&row.job_title)
    .bind(row.start_date)
    .bind(row.end_date)
    .bind(row.is_current)
    .bind(&row.location)
    .bind(&row.description)
    .bind(row.updated_at)
    .execute(&state.db)
    .await?;
    Ok(Json(row))
}

/// DELETE /api/v1/profile/experiences/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM experiences WHERE id = $1 AND user_id = $2")
        .bind(&id)
        .bind(&user.id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Experience not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

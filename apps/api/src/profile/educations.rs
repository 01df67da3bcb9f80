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
use crate::models::profile::EducationRow;
use crate::state::AppState;
use crate::validation::{require_non_empty, validate_date_range};

#[derive(Debug, Deserialize)]
pub struct EducationCreate {
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_current: bool,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EducationUpdate {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_current: Option<bool>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl EducationCreate {
    fn into_row(self, user_id: &str) -> Result<EducationRow, AppError> {
        let row = EducationRow {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            institution: self.institution,
            degree: self.degree,
            field_of_study: self.field_of_study,
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

fn apply_update(mut row: EducationRow, patch: EducationUpdate) -> Result<EducationRow, AppError> {
    if let Some(v) = patch.institution {
        row.institution = v;
    }
    if let Some(v) = patch.degree {
        row.degree = v;
    }
    if let Some(v) = patch.field_of_study {
        row.field_of_study = v;
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

fn validate(row: &EducationRow) -> Result<(), AppError> {
    require_non_empty("institution", &row.institution)?;
    require_non_empty("degree", &row.degree)?;
    require_non_empty("field_of_study", &row.field_of_study)?;
    validate_date_range(row.start_date, row.end_date)?;
    Ok(())
}

async fn fetch_owned(state: &AppState, id: &str, user_id: &str) -> Result<EducationRow, AppError> {
    sqlx::query_as::<_, EducationRow>("SELECT * FROM educations WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Education not found".to_string()))
}

/// POST /api/v1/profile/educations
pub async fn handle_create(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Json(req): Json<EducationCreate>,
) -> Result<Json<EducationRow>, AppError> {
    let row = req.into_row(&user.id)?;
    sqlx::query(
        r#"
        INSERT INTO educations
            (id, user_id, institution, degree, field_of_study, start_date, end_date,
             is_current, location, description, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(&row.id)
    .bind(&row.user_id)
    .bind(&row.institution)
    .bind(&row.degree)
    .bind(&row.field_of_study)
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

/// GET /api/v1/profile/educations
pub async fn handle_list(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
) -> Result<Json<Vec<EducationRow>>, AppError> {
    let rows = sqlx::query_as::<_, EducationRow>(
        "SELECT * FROM educations WHERE user_id = $1 ORDER BY start_date DESC",
    )
    .bind(&user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// GET /api/v1/profile/educations/:id
pub async fn handle_get(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<String>,
) -> Result<Json<EducationRow>, AppError> {
    Ok(Json(fetch_owned(&state, &id, &user.id).await?))
}

/// PUT /api/v1/profile/educations/:id
pub async fn handle_update(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<String>,
    Json(patch): Json<EducationUpdate>,
) -> Result<Json<EducationRow>, AppError> {
    let row = apply_update(fetch_owned(&state, &id, &user.id).await?, patch)?;
    sqlx::query(
        r#"
        UPDATE educations SET
            institution = $3, degree = $4, field_of_study = $5, start_date = $6,
            end_date = $7, is_current = $8, location = $9, description = $10,
            updated_at = $11
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(&row.id)
    .bind(&row.user_id)
    .bind(&row.institution)
    .bind(&row.degree)
    .bind(&row.field_of_study)
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

/// DELETE /api/v1/profile/educations/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM educations WHERE id = $1 AND user_id = $2")
        .bind(&id)
        .bind(&user.id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Education not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

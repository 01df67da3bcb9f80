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
use crate::models::profile::AchievementRow;
use crate::state::AppState;
use crate::validation::require_non_empty;

#[derive(Debug, Deserialize)]
pub struct AchievementCreate {
    pub title: String,
    pub description: String,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AchievementUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl AchievementCreate {
    fn into_row(self, user_id: &str) -> Result<AchievementRow, AppError> {
        let row = AchievementRow {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: self.title,
            description: self.description,
            date: self.date,
            created_at: Utc::now(),
            updated_at: None,
        };
        validate(&row)?;
        Ok(row)
    }
}

fn apply_update(mut row: AchievementRow, patch: AchievementUpdate) -> Result<AchievementRow, AppError> {
    if let Some(v) = patch.title {
        row.title = v;
    }
    if let Some(v) = patch.description {
        row.description = v;
    }
    if patch.date.is_some() {
        row.date = patch.date;
    }
    row.updated_at = Some(Utc::now());
    validate(&row)?;
    Ok(row)
}

fn validate(row: &AchievementRow) -> Result<(), AppError> {
    require_non_empty("title", &row.title)?;
    require_non_empty("description", &row.description)?;
    Ok(())
}

async fn fetch_owned(state: &AppState, id: &str, user_id: &str) -> Result<AchievementRow, AppError> {
    sqlx::query_as::<_, AchievementRow>("SELECT * FROM achievements WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Achievement not found".to_string()))
}

/// POST /api/v1/profile/achievements
pub async fn handle_create(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Json(req): Json<AchievementCreate>,
) -> Result<Json<AchievementRow>, AppError> {
    let row = req.into_row(&user.id)?;
    sqlx::query(
        "INSERT INTO achievements (id, user_id, title, description, date, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(&row.id)
    .bind(&row.user_id)
    .bind(&row.title)
    .bind(&row.description)
    .bind(row.date)
    .bind(row.created_at)
    .execute(&state.db)
    .await?;
    Ok(Json(row))
}

/// GET /api/v1/profile/achievements
pub async fn handle_list(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
) -> Result<Json<Vec<AchievementRow>>, AppError> {
    let rows = sqlx::query_as::<_, AchievementRow>(
        "SELECT * FROM achievements WHERE user_id = $1 ORDER BY date DESC NULLS LAST",
    )
    .bind(&user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// GET /api/v1/profile/achievements/:id
pub async fn handle_get(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<String>,
) -> Result<Json<AchievementRow>, AppError> {
    Ok(Json(fetch_owned(&state, &id, &user.id).await?))
}

/// PUT /api/v1/profile/achievements/:id
pub async fn handle_update(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<String>,
    Json(patch): Json<AchievementUpdate>,
) -> Result<Json<AchievementRow>, AppError> {
    let row = apply_update(fetch_owned(&state, &id, &user.id).await?, patch)?;
    sqlx::query(
        "UPDATE achievements SET title = $3, description = $4, date = $5, updated_at = $6 \
         WHERE id = $1 AND user_id = $2",
    )
    .bind(&row.id)
    .bind(&row.user_id)
    .bind(&row.title)
    .bind(&row.description)
    .bind(row.date)
    .bind(row.updated_at)
    .execute(&state.db)
    .await?;
    Ok(Json(row))
}

/// DELETE /api/v1/profile/achievements/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM achievements WHERE id = $1 AND user_id = $2")
        .bind(&id)
        .bind(&user.id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Achievement not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_keeps_date_when_absent() {
        let row = AchievementCreate {
            title: "Best Student Project Award".to_string(),
            description: "Won the best student project award".to_string(),
            date: Some(Utc::now()),
        }
        .into_row("u")
        .unwrap();

        let original_date = row.date;
        let updated = apply_update(
            row,
            AchievementUpdate {
                title: Some("Dean's List".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.title, "Dean's List");
        assert_eq!(updated.date, original_date);
    }

    #[test]
    fn test_blank_description_is_rejected() {
        let req = AchievementCreate {
            title: "Award".to_string(),
            description: "".to_string(),
            date: None,
        };
        assert!(req.into_row("u").is_err());
    }
}

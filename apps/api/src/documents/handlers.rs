use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::ActiveUser;
use crate::documents::placeholder::{placeholder_content, placeholder_title};
use crate::errors::AppError;
use crate::models::document::{DocumentRow, DocumentType};
use crate::state::AppState;
use crate::validation::require_non_empty;

#[derive(Debug, Deserialize)]
pub struct DocumentCreate {
    pub title: String,
    pub content: String,
    pub document_type: DocumentType,
    pub employer_name: Option<String>,
    pub job_title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DocumentUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub employer_name: Option<String>,
    pub job_title: Option<String>,
}

/// Generation inputs. Only the type and target fields reach the placeholder;
/// the selection fields are accepted so clients can send the full request.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct DocumentGenerateRequest {
    pub document_type: DocumentType,
    pub employer_name: Option<String>,
    pub job_title: Option<String>,
    pub job_description: Option<String>,
    #[serde(default = "default_true")]
    pub use_all_experiences: bool,
    pub experience_ids: Option<Vec<String>>,
    pub education_ids: Option<Vec<String>>,
    pub achievement_ids: Option<Vec<String>>,
}

fn default_true() -> bool {
    true
}

fn new_row(
    user_id: &str,
    title: String,
    content: String,
    document_type: DocumentType,
    employer_name: Option<String>,
    job_title: Option<String>,
) -> DocumentRow {
    DocumentRow {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        title,
        content,
        document_type: document_type.as_str().to_string(),
        employer_name,
        job_title,
        file_path: None,
        file_url: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn apply_update(mut row: DocumentRow, patch: DocumentUpdate) -> Result<DocumentRow, AppError> {
    if let Some(v) = patch.title {
        row.title = v;
    }
    if let Some(v) = patch.content {
        row.content = v;
    }
    if patch.employer_name.is_some() {
        row.employer_name = patch.employer_name;
    }
    if patch.job_title.is_some() {
        row.job_title = patch.job_title;
    }
    require_non_empty("title", &row.title)?;
    row.updated_at = Some(Utc::now());
    Ok(row)
}

async fn insert(state: &AppState, row: &DocumentRow) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO documents
            (id, user_id, title, content, document_type, employer_name, job_title,
             file_path, file_url, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(&row.id)
    .bind(&row.user_id)
    .bind(&row.title)
    .bind(&row.content)
    .bind(&row.document_type)
    .bind(&row.employer_name)
    .bind(&row.job_title)
    .bind(&row.file_path)
    .bind(&row.file_url)
    .bind(row.created_at)
    .execute(&state.db)
    .await?;
    Ok(())
}

async fn fetch_owned(state: &AppState, id: &str, user_id: &str) -> Result<DocumentRow, AppError> {
    sqlx::query_as::<_, DocumentRow>("SELECT * FROM documents WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))
}

/// POST /api/v1/documents
pub async fn handle_create(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Json(req): Json<DocumentCreate>,
) -> Result<Json<DocumentRow>, AppError> {
    require_non_empty("title", &req.title)?;
    let row = new_row(
        &user.id,
        req.title,
        req.content,
        req.document_type,
        req.employer_name,
        req.job_title,
    );
    insert(&state, &row).await?;
    Ok(Json(row))
}

/// GET /api/v1/documents
pub async fn handle_list(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
) -> Result<Json<Vec<DocumentRow>>, AppError> {
    let rows = sqlx::query_as::<_, DocumentRow>(
        "SELECT * FROM documents WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(&user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// GET /api/v1/documents/:id
pub async fn handle_get(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<String>,
) -> Result<Json<DocumentRow>, AppError> {
    Ok(Json(fetch_owned(&state, &id, &user.id).await?))
}

/// PUT /api/v1/documents/:id
pub async fn handle_update(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<String>,
    Json(patch): Json<DocumentUpdate>,
) -> Result<Json<DocumentRow>, AppError> {
    let row = apply_update(fetch_owned(&state, &id, &user.id).await?, patch)?;
    sqlx::query(
        r#"
        UPDATE documents SET
            title = $3, content = $4, employer_name = $5, job_title = $6, updated_at = $7
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(&row.id)
    .bind(&row.user_id)
    .bind(&row.title)
    .bind(&row.content)
    .bind(&row.employer_name)
    .bind(&row.job_title)
    .bind(row.updated_at)
    .execute(&state.db)
    .await?;
    Ok(Json(row))
}

/// DELETE /api/v1/documents/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND user_id = $2")
        .bind(&id)
        .bind(&user.id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Document not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/documents/generate
///
/// Stores a placeholder document; no generation pipeline runs.
pub async fn handle_generate(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Json(req): Json<DocumentGenerateRequest>,
) -> Result<Json<DocumentRow>, AppError> {
    let row = new_row(
        &user.id,
        placeholder_title(req.document_type),
        placeholder_content(req.document_type),
        req.document_type,
        req.employer_name,
        req.job_title,
    );
    insert(&state, &row).await?;
    tracing::info!("Stored placeholder {} {} for account {}", row.document_type, row.id, user.id);
    Ok(Json(row))
}

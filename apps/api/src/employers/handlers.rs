use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::ActiveUser;
use crate::errors::AppError;
use crate::models::employer::EmployerRow;
use crate::state::AppState;
use crate::validation::ValidationError;

const PLACEHOLDER_INDUSTRY: &str = "Technology";
const PLACEHOLDER_VALUES: [&str; 3] = ["innovation", "teamwork", "customer-focus"];
const PLACEHOLDER_KEYWORDS: [&str; 3] = ["technology", "software", "development"];

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub employer_url: String,
}

/// Derives an employer name from its URL: scheme and path are dropped and
/// every `www.` is removed from the host.
pub fn employer_name_from_url(url: &str) -> Result<String, ValidationError> {
    let after_scheme = url.trim().split("//").last().unwrap_or_default();
    let host = after_scheme.split('/').next().unwrap_or_default();
    let name = host.replace("www.", "");
    if name.is_empty() {
        return Err(ValidationError::InvalidUrl(url.to_string()));
    }
    Ok(name)
}

// Concurrent scrapes of one host both land here; the loser inserts nothing.
const INSERT_PLACEHOLDER: &str = r#"
    INSERT INTO employers
        (id, name, website, industry, description, "values", keywords, last_scraped, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    ON CONFLICT (name) DO NOTHING
"#;

fn placeholder_employer(name: String, website: String) -> EmployerRow {
    EmployerRow {
        id: Uuid::new_v4().to_string(),
        description: Some(format!("This is a placeholder description for {name}")),
        name,
        website: Some(website),
        industry: Some(PLACEHOLDER_INDUSTRY.to_string()),
        values: Some(PLACEHOLDER_VALUES.iter().map(|s| s.to_string()).collect()),
        keywords: Some(PLACEHOLDER_KEYWORDS.iter().map(|s| s.to_string()).collect()),
        last_scraped: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

/// GET /api/v1/employers
pub async fn handle_list(
    State(state): State<AppState>,
    ActiveUser(_user): ActiveUser,
) -> Result<Json<Vec<EmployerRow>>, AppError> {
    let rows = sqlx::query_as::<_, EmployerRow>("SELECT * FROM employers ORDER BY name")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(rows))
}

/// GET /api/v1/employers/:id
pub async fn handle_get(
    State(state): State<AppState>,
    ActiveUser(_user): ActiveUser,
    Path(id): Path<String>,
) -> Result<Json<EmployerRow>, AppError> {
    sqlx::query_as::<_, EmployerRow>("SELECT * FROM employers WHERE id = $1")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Employer not found".to_string()))
}

/// POST /api/v1/employers/scrape
///
/// Returns the employer matching the URL's host, creating a placeholder
/// record when none exists. Nothing is fetched from the URL.
pub async fn handle_scrape(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    Json(req): Json<ScrapeRequest>,
) -> Result<Json<EmployerRow>, AppError> {
    let name = employer_name_from_url(&req.employer_url)?;

    let existing = sqlx::query_as::<_, EmployerRow>("SELECT * FROM employers WHERE name = $1")
        .bind(&name)
        .fetch_optional(&state.db)
        .await?;
    if let Some(employer) = existing {
        return Ok(Json(employer));
    }

    let placeholder = placeholder_employer(name, req.employer_url);
    let inserted = sqlx::query(INSERT_PLACEHOLDER)
        .bind(&placeholder.id)
        .bind(&placeholder.name)
        .bind(&placeholder.website)
        .bind(&placeholder.industry)
        .bind(&placeholder.description)
        .bind(&placeholder.values)
        .bind(&placeholder.keywords)
        .bind(placeholder.last_scraped)
        .bind(placeholder.created_at)
        .execute(&state.db)
        .await?
        .rows_affected();
    if inserted == 1 {
        info!("Created placeholder employer '{}' for account {}", placeholder.name, user.id);
    }

    let employer = sqlx::query_as::<_, EmployerRow>("SELECT * FROM employers WHERE name = $1")
        .bind(&placeholder.name)
        .fetch_one(&state.db)
        .await?;
    Ok(Json(employer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_strips_scheme_www_and_path() {
        assert_eq!(
            employer_name_from_url("https://www.google.com.au/careers/jobs").unwrap(),
            "google.com.au"
        );
        assert_eq!(
            employer_name_from_url("http://commbank.com.au").unwrap(),
            "commbank.com.au"
        );
    }

    #[test]
    fn test_name_without_scheme() {
        assert_eq!(employer_name_from_url("www.atlassian.com/").unwrap(), "atlassian.com");
    }

    #[test]
    fn test_empty_host_is_rejected() {
        assert!(employer_name_from_url("").is_err());
        assert!(employer_name_from_url("https:///path").is_err());
        assert!(employer_name_from_url("https://").is_err());
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(employer_name_from_url("  https://acme.io  ").unwrap(), "acme.io");
    }

    #[test]
    fn test_every_www_is_removed() {
        assert_eq!(
            employer_name_from_url("https://www.shop.www.example.com/").unwrap(),
            "shop.example.com"
        );
    }

    #[test]
    fn test_placeholder_insert_tolerates_existing_name() {
        assert!(INSERT_PLACEHOLDER.contains("ON CONFLICT (name) DO NOTHING"));
    }

    #[test]
    fn test_placeholder_fields() {
        let e = placeholder_employer("acme.io".to_string(), "https://acme.io".to_string());
        assert_eq!(e.industry.as_deref(), Some("Technology"));
        assert_eq!(
            e.description.as_deref(),
            Some("This is a placeholder description for acme.io")
        );
        assert_eq!(e.values.unwrap().len(), 3);
        assert!(e.last_scraped.is_none());
    }
}

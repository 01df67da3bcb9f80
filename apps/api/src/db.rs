use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Idempotent schema statements, applied in order at startup.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id                    TEXT PRIMARY KEY,
        email                 TEXT NOT NULL UNIQUE,
        hashed_password       TEXT NOT NULL,
        first_name            TEXT NOT NULL,
        last_name             TEXT NOT NULL,
        phone                 TEXT,
        subscription_status   TEXT NOT NULL DEFAULT 'free'
            CHECK (subscription_status IN ('free', 'monthly', 'yearly', 'one_time')),
        subscription_end_date TIMESTAMPTZ,
        is_active             BOOLEAN NOT NULL DEFAULT TRUE,
        is_verified           BOOLEAN NOT NULL DEFAULT FALSE,
        created_at            TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at            TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS experiences (
        id           TEXT PRIMARY KEY,
        user_id      TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        company_name TEXT NOT NULL,
        job_title    TEXT NOT NULL,
        start_date   TIMESTAMPTZ NOT NULL,
        end_date     TIMESTAMPTZ,
        is_current   BOOLEAN NOT NULL DEFAULT FALSE,
        location     TEXT,
        description  TEXT,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at   TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS experiences_user_id_idx ON experiences (user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS educations (
        id             TEXT PRIMARY KEY,
        user_id        TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        institution    TEXT NOT NULL,
        degree         TEXT NOT NULL,
        field_of_study TEXT NOT NULL,
        start_date     TIMESTAMPTZ NOT NULL,
        end_date       TIMESTAMPTZ,
        is_current     BOOLEAN NOT NULL DEFAULT FALSE,
        location       TEXT,
        description    TEXT,
        created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at     TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS educations_user_id_idx ON educations (user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS achievements (
        id          TEXT PRIMARY KEY,
        user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        title       TEXT NOT NULL,
        description TEXT NOT NULL,
        date        TIMESTAMPTZ,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at  TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS achievements_user_id_idx ON achievements (user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS documents (
        id            TEXT PRIMARY KEY,
        user_id       TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        title         TEXT NOT NULL,
        content       TEXT NOT NULL,
        document_type TEXT NOT NULL CHECK (document_type IN ('cv', 'cover_letter')),
        employer_name TEXT,
        job_title     TEXT,
        file_path     TEXT,
        file_url      TEXT,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at    TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS documents_user_id_idx ON documents (user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS employers (
        id           TEXT PRIMARY KEY,
        name         TEXT NOT NULL UNIQUE,
        website      TEXT,
        industry     TEXT,
        description  TEXT,
        "values"     TEXT[],
        keywords     TEXT[],
        last_scraped TIMESTAMPTZ,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at   TIMESTAMPTZ
    )
    "#,
];

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates any missing tables and indexes.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema ready ({} statements)", SCHEMA.len());
    Ok(())
}

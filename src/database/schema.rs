use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;

/// Idempotent DDL, applied in order by `folio db init` and at server start
const STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS profiles (
        id SERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        title VARCHAR(255) NOT NULL,
        email VARCHAR(255) NOT NULL,
        access_key_digest CHAR(64) NOT NULL UNIQUE,
        api_key VARCHAR(255) UNIQUE,
        image VARCHAR(255),
        about TEXT NOT NULL DEFAULT '',
        github VARCHAR(255),
        linkedin VARCHAR(255),
        behance VARCHAR(255),
        facebook VARCHAR(255)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS projects (
        id SERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        description TEXT NOT NULL,
        image VARCHAR(255) NOT NULL DEFAULT '',
        link VARCHAR(255) NOT NULL,
        technologies TEXT NOT NULL,
        project_type VARCHAR(50) NOT NULL,
        has_article BOOLEAN NOT NULL DEFAULT FALSE,
        article_link VARCHAR(255),
        profile_id INTEGER NOT NULL REFERENCES profiles(id) ON DELETE CASCADE
    )"#,
    r#"CREATE TABLE IF NOT EXISTS skills (
        id SERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        category VARCHAR(50) NOT NULL,
        profile_id INTEGER NOT NULL REFERENCES profiles(id) ON DELETE CASCADE
    )"#,
    r#"CREATE TABLE IF NOT EXISTS employments (
        id SERIAL PRIMARY KEY,
        company VARCHAR(255) NOT NULL,
        position VARCHAR(255) NOT NULL,
        description TEXT NOT NULL,
        start_date DATE NOT NULL,
        end_date DATE,
        is_active BOOLEAN NOT NULL DEFAULT FALSE,
        profile_id INTEGER NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        CONSTRAINT employments_active_end_date CHECK (is_active = (end_date IS NULL))
    )"#,
    r#"CREATE TABLE IF NOT EXISTS system_prompts (
        id SERIAL PRIMARY KEY,
        prompt TEXT NOT NULL,
        profile_id INTEGER NOT NULL UNIQUE REFERENCES profiles(id) ON DELETE CASCADE
    )"#,
    "CREATE INDEX IF NOT EXISTS projects_profile_id_idx ON projects (profile_id)",
    "CREATE INDEX IF NOT EXISTS skills_profile_id_idx ON skills (profile_id)",
    "CREATE INDEX IF NOT EXISTS employments_profile_id_idx ON employments (profile_id)",
];

pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema ensured ({} statements)", STATEMENTS.len());
    Ok(())
}

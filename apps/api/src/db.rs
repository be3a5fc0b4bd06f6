use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

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

/// Creates tables and indexes when missing. Every statement is idempotent,
/// so startup is safe to repeat.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            is_recruiter BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await?;

    // seq is the upload-order tiebreak for listing and ranking.
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS resumes (
            id UUID PRIMARY KEY,
            seq BIGSERIAL,
            owner_id UUID NOT NULL REFERENCES users(id),
            filename TEXT NOT NULL,
            original_filename TEXT NOT NULL,
            file_size BIGINT NOT NULL,
            content TEXT NOT NULL,
            features JSONB NOT NULL,
            embedding JSONB,
            s3_key TEXT NOT NULL,
            idempotency_key TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS resumes_owner_seq_idx ON resumes (owner_id, seq)")
        .execute(pool)
        .await?;

    // Replay keys are scoped per owner; the same key from two accounts
    // stays independent.
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS resumes_owner_idempotency_idx
         ON resumes (owner_id, idempotency_key)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS jobs (
            id UUID PRIMARY KEY,
            owner_id UUID NOT NULL REFERENCES users(id),
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            requirements TEXT[] NOT NULL DEFAULT '{}',
            location TEXT,
            salary_min BIGINT,
            salary_max BIGINT,
            company TEXT NOT NULL,
            idempotency_key TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS jobs_owner_idempotency_idx
         ON jobs (owner_id, idempotency_key)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS matches (
            id UUID PRIMARY KEY,
            job_id UUID NOT NULL REFERENCES jobs(id),
            resume_id UUID NOT NULL REFERENCES resumes(id),
            score DOUBLE PRECISION NOT NULL,
            evidence JSONB NOT NULL,
            missing_requirements JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await?;

    info!("Database schema ensured");
    Ok(())
}

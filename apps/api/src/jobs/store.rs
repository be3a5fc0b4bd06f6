use sqlx::PgPool;
use uuid::Uuid;

use crate::models::job::JobRow;

pub struct NewJob<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub requirements: &'a [String],
    pub location: Option<&'a str>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub company: &'a str,
    pub idempotency_key: &'a str,
}

/// Replay lookup, scoped to the caller. A key reused by another account
/// resolves to a fresh insert, not to that account's job.
pub async fn find_by_idempotency_key(
    pool: &PgPool,
    key: &str,
    owner_id: Uuid,
) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM jobs WHERE idempotency_key = $1 AND owner_id = $2")
        .bind(key)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_job(pool: &PgPool, new: NewJob<'_>) -> Result<JobRow, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO jobs
             (id, owner_id, title, description, requirements, location,
              salary_min, salary_max, company, idempotency_key)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING *",
    )
    .bind(new.id)
    .bind(new.owner_id)
    .bind(new.title)
    .bind(new.description)
    .bind(new.requirements)
    .bind(new.location)
    .bind(new.salary_min)
    .bind(new.salary_max)
    .bind(new.company)
    .bind(new.idempotency_key)
    .fetch_one(pool)
    .await
}

pub async fn fetch_owned(
    pool: &PgPool,
    id: Uuid,
    owner_id: Uuid,
) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM jobs WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
}

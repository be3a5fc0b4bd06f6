//! Resume persistence. Every query is owner-scoped, the idempotency lookup
//! included: a replay never re-runs extraction or storage, and a key reused
//! by another account never surfaces this owner's rows.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::resume::ResumeRow;

pub struct NewResume<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub filename: &'a str,
    pub original_filename: &'a str,
    pub file_size: i64,
    pub content: &'a str,
    pub features: &'a serde_json::Value,
    pub s3_key: &'a str,
    pub idempotency_key: &'a str,
}

pub async fn find_by_idempotency_key(
    pool: &PgPool,
    key: &str,
    owner_id: Uuid,
) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM resumes WHERE idempotency_key = $1 AND owner_id = $2")
        .bind(key)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_resume(pool: &PgPool, new: NewResume<'_>) -> Result<ResumeRow, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO resumes
             (id, owner_id, filename, original_filename, file_size, content,
              features, s3_key, idempotency_key)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING *",
    )
    .bind(new.id)
    .bind(new.owner_id)
    .bind(new.filename)
    .bind(new.original_filename)
    .bind(new.file_size)
    .bind(new.content)
    .bind(new.features)
    .bind(new.s3_key)
    .bind(new.idempotency_key)
    .fetch_one(pool)
    .await
}

/// One page of the owner's resumes plus the total matching count. `search`
/// filters on extracted content or the original filename.
pub async fn list_by_owner(
    pool: &PgPool,
    owner_id: Uuid,
    limit: i64,
    offset: i64,
    search: Option<&str>,
) -> Result<(Vec<ResumeRow>, i64), sqlx::Error> {
    let limit = limit.max(0);
    let offset = offset.max(0);
    match search {
        Some(q) => {
            let pattern = format!("%{q}%");
            let total: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM resumes
                 WHERE owner_id = $1 AND (content ILIKE $2 OR original_filename ILIKE $2)",
            )
            .bind(owner_id)
            .bind(&pattern)
            .fetch_one(pool)
            .await?;
            let items = sqlx::query_as(
                "SELECT * FROM resumes
                 WHERE owner_id = $1 AND (content ILIKE $2 OR original_filename ILIKE $2)
                 ORDER BY seq
                 LIMIT $3 OFFSET $4",
            )
            .bind(owner_id)
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
            Ok((items, total))
        }
        None => {
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resumes WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_one(pool)
                .await?;
            let items = sqlx::query_as(
                "SELECT * FROM resumes WHERE owner_id = $1 ORDER BY seq LIMIT $2 OFFSET $3",
            )
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
            Ok((items, total))
        }
    }
}

pub async fn fetch_owned(
    pool: &PgPool,
    id: Uuid,
    owner_id: Uuid,
) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM resumes WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
}

/// Every resume the owner has uploaded, in upload order. Ranking relies on
/// this order being stable across calls.
pub async fn corpus_for_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<ResumeRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM resumes WHERE owner_id = $1 ORDER BY seq")
        .bind(owner_id)
        .fetch_all(pool)
        .await
}

use axum::extract::{Multipart, Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ingest;
use crate::matching::features;
use crate::models::resume::{ResumeListResponse, ResumeResponse, ResumeRow};
use crate::privacy::{Redactor, Viewer};
use crate::resumes::store::{self, NewResume};
use crate::state::AppState;

const IDEMPOTENCY_HEADER: &str = "idempotency-key";

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub q: Option<String>,
}

fn default_limit() -> i64 {
    10
}

/// POST /api/resumes — multipart upload. Extracts text, derives features,
/// stores the raw file in S3 and the row in Postgres. Replays of the same
/// idempotency key return the stored resume without re-ingesting.
pub async fn handle_upload(
    State(state): State<AppState>,
    viewer: Viewer,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<ResumeResponse>, AppError> {
    let idempotency_key = headers
        .get(IDEMPOTENCY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Some(existing) =
        store::find_by_idempotency_key(&state.db, &idempotency_key, viewer.id).await?
    {
        info!("Replayed upload for idempotency key {idempotency_key}");
        return Ok(Json(present_resume(existing, &viewer, &state.redactor)));
    }

    let mut upload: Option<(String, Option<String>, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let original_filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        upload = Some((original_filename, content_type, data));
    }
    let (original_filename, content_type, data) = upload
        .ok_or_else(|| AppError::Validation("Missing multipart field 'file'".to_string()))?;
    if data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    let content = ingest::extract_upload(&original_filename, &data)?;
    if content.trim().is_empty() {
        return Err(AppError::Validation(
            "No text could be extracted from the file".to_string(),
        ));
    }
    let extracted = features::extract(&content, &state.match_config);

    let resume_id = Uuid::new_v4();
    let stored_filename = format!(
        "{original_filename}_{}",
        hex::encode(&Uuid::new_v4().as_bytes()[..8])
    );
    let s3_key = format!("resumes/{}/{}/{}", viewer.id, resume_id, stored_filename);
    state
        .s3
        .put_object()
        .bucket(&state.config.s3_bucket)
        .key(&s3_key)
        .body(ByteStream::from(data.to_vec()))
        .set_content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("S3 upload failed: {e}")))?;
    info!("Uploaded resume to s3://{}/{}", state.config.s3_bucket, s3_key);

    let row = store::insert_resume(
        &state.db,
        NewResume {
            id: resume_id,
            owner_id: viewer.id,
            filename: &stored_filename,
            original_filename: &original_filename,
            file_size: data.len() as i64,
            content: &content,
            features: &serde_json::to_value(&extracted).map_err(anyhow::Error::from)?,
            s3_key: &s3_key,
            idempotency_key: &idempotency_key,
        },
    )
    .await?;

    info!("Stored resume {} for user {}", row.id, viewer.id);
    Ok(Json(present_resume(row, &viewer, &state.redactor)))
}

/// GET /api/resumes — paginated listing with optional `q` content search.
pub async fn handle_list(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(params): Query<ListParams>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let (rows, total) = store::list_by_owner(
        &state.db,
        viewer.id,
        params.limit,
        params.offset,
        params.q.as_deref(),
    )
    .await?;

    let next_offset = next_offset(params.offset, params.limit, total);
    let items = rows
        .into_iter()
        .map(|row| present_resume(row, &viewer, &state.redactor))
        .collect();
    Ok(Json(ResumeListResponse { items, next_offset, total }))
}

/// GET /api/resumes/:id
pub async fn handle_get(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeResponse>, AppError> {
    let row = store::fetch_owned(&state.db, id, viewer.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;
    Ok(Json(present_resume(row, &viewer, &state.redactor)))
}

/// Start of the following page, or None when the listing is exhausted.
/// Offset and limit are caller-controlled; the sum saturates at i64::MAX.
fn next_offset(offset: i64, limit: i64, total: i64) -> Option<i64> {
    let next = offset.saturating_add(limit);
    (next < total).then_some(next)
}

/// Builds the wire view, applying viewer-conditional redaction to both the
/// extracted text and the structured contact fields.
fn present_resume(row: ResumeRow, viewer: &Viewer, redactor: &Redactor) -> ResumeResponse {
    let features = redactor.redact_features(&row.features(), viewer);
    let content = redactor.redact_text(&row.content, viewer);
    ResumeResponse {
        id: row.id,
        filename: row.filename,
        original_filename: row.original_filename,
        file_size: row.file_size,
        content,
        features,
        owner_id: row.owner_id,
        created_at: row.created_at,
    }
}

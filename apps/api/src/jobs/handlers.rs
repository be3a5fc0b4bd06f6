use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::store::{self, NewJob};
use crate::models::job::JobResponse;
use crate::privacy::Viewer;
use crate::state::AppState;

const IDEMPOTENCY_HEADER: &str = "idempotency-key";

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub requirements: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary_min: Option<i64>,
    #[serde(default)]
    pub salary_max: Option<i64>,
    pub company: String,
}

/// POST /api/jobs
pub async fn handle_create(
    State(state): State<AppState>,
    viewer: Viewer,
    headers: HeaderMap,
    Json(req): Json<CreateJobRequest>,
) -> Result<Json<JobResponse>, AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if req.company.trim().is_empty() {
        return Err(AppError::Validation("Company is required".to_string()));
    }
    if let (Some(min), Some(max)) = (req.salary_min, req.salary_max) {
        if min > max {
            return Err(AppError::Validation(
                "salary_min cannot exceed salary_max".to_string(),
            ));
        }
    }

    let idempotency_key = headers
        .get(IDEMPOTENCY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    if let Some(existing) =
        store::find_by_idempotency_key(&state.db, &idempotency_key, viewer.id).await?
    {
        info!("Replayed job creation for idempotency key {idempotency_key}");
        return Ok(Json(JobResponse::from(existing)));
    }

    let row = store::insert_job(
        &state.db,
        NewJob {
            id: Uuid::new_v4(),
            owner_id: viewer.id,
            title: &req.title,
            description: &req.description,
            requirements: &req.requirements,
            location: req.location.as_deref(),
            salary_min: req.salary_min,
            salary_max: req.salary_max,
            company: &req.company,
            idempotency_key: &idempotency_key,
        },
    )
    .await?;

    info!("Created job {} for user {}", row.id, viewer.id);
    Ok(Json(JobResponse::from(row)))
}

/// GET /api/jobs/:id
pub async fn handle_get(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<Uuid>,
) -> Result<Json<JobResponse>, AppError> {
    let row = store::fetch_owned(&state.db, id, viewer.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    Ok(Json(JobResponse::from(row)))
}

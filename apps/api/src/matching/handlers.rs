use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::store as jobs_store;
use crate::matching::evidence::EvidenceItem;
use crate::matching::pipeline::{
    self, AnswerSource, DocumentSnapshot, MatchOutcome, QuestionAnswer,
};
use crate::models::resume::ResumeRow;
use crate::privacy::{Redactor, Viewer};
use crate::resumes::store as resumes_store;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    #[serde(default = "default_top_n")]
    pub top_n: i64,
}

fn default_top_n() -> i64 {
    10
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub matches: Vec<MatchOutcome>,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub query: String,
    #[serde(default = "default_k")]
    pub k: i64,
}

fn default_k() -> i64 {
    5
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub sources: Vec<AnswerSource>,
}

/// POST /api/jobs/:id/match — ranks the caller's resumes against one job
/// and persists the run.
pub async fn handle_match(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(job_id): Path<Uuid>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let job = jobs_store::fetch_owned(&state.db, job_id, viewer.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    let corpus: Vec<DocumentSnapshot> = resumes_store::corpus_for_owner(&state.db, viewer.id)
        .await?
        .iter()
        .map(snapshot_from_row)
        .collect();

    let outcomes = pipeline::rank_for_job(
        &job.to_spec(),
        &corpus,
        req.top_n,
        state.scorer.as_ref(),
        &state.match_config,
    );
    record_matches(&state.db, job.id, &outcomes).await?;
    info!(
        "Matched job {} against {} resumes, kept {}",
        job.id,
        corpus.len(),
        outcomes.len()
    );

    let matches = outcomes
        .into_iter()
        .map(|outcome| redact_outcome(outcome, &viewer, &state.redactor))
        .collect();
    Ok(Json(MatchResponse { matches }))
}

/// POST /api/ask — free-text question over the caller's resumes.
pub async fn handle_ask(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    if req.query.trim().is_empty() {
        return Err(AppError::Validation("Query must not be empty".to_string()));
    }

    let corpus: Vec<DocumentSnapshot> = resumes_store::corpus_for_owner(&state.db, viewer.id)
        .await?
        .iter()
        .map(snapshot_from_row)
        .collect();

    let QuestionAnswer { answer, sources } = pipeline::answer_question(
        &req.query,
        &corpus,
        req.k,
        state.scorer.as_ref(),
        &state.match_config,
    );

    // Both the rendered answer and the raw snippets quote resume text, so
    // each goes through the viewer-conditional sweep.
    let answer = state.redactor.redact_text(&answer, &viewer);
    let sources = sources
        .into_iter()
        .map(|source| AnswerSource {
            resume_id: source.resume_id,
            filename: source.filename,
            similarity_score: source.similarity_score,
            snippets: source
                .snippets
                .iter()
                .map(|snippet| state.redactor.redact_text(snippet, &viewer))
                .collect(),
        })
        .collect();

    Ok(Json(AskResponse { answer, sources }))
}

fn snapshot_from_row(row: &ResumeRow) -> DocumentSnapshot {
    DocumentSnapshot {
        id: row.id,
        filename: row.original_filename.clone(),
        text: row.content.clone(),
        features: row.features(),
        embedding: row.embedding(),
    }
}

fn redact_outcome(outcome: MatchOutcome, viewer: &Viewer, redactor: &Redactor) -> MatchOutcome {
    let MatchOutcome { resume_id, filename, score, evidence, missing_requirements } = outcome;
    let evidence = evidence
        .into_iter()
        .map(|item| EvidenceItem {
            requirement: item.requirement,
            evidence: redactor.redact_text(&item.evidence, viewer),
            kind: item.kind,
        })
        .collect();
    MatchOutcome { resume_id, filename, score, evidence, missing_requirements }
}

/// Persists one row per kept result. Match history is append-only, and a
/// run commits as a whole; a failure leaves no partial history behind.
async fn record_matches(
    pool: &PgPool,
    job_id: Uuid,
    outcomes: &[MatchOutcome],
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    for outcome in outcomes {
        sqlx::query(
            "INSERT INTO matches (id, job_id, resume_id, score, evidence, missing_requirements)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::new_v4())
        .bind(job_id)
        .bind(outcome.resume_id)
        .bind(outcome.score)
        .bind(serde_json::to_value(&outcome.evidence).map_err(anyhow::Error::from)?)
        .bind(serde_json::to_value(&outcome.missing_requirements).map_err(anyhow::Error::from)?)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::matching::features::ResumeFeatures;

/// Stored resume. `features` and `embedding` are JSONB columns decoded on
/// demand; the `seq` column keeps corpus order but is only consumed in SQL.
#[derive(Debug, Clone, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub file_size: i64,
    pub content: String,
    pub features: Value,
    pub embedding: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl ResumeRow {
    /// Decodes stored features. Features are derived and recomputable, so a
    /// malformed column decodes as empty rather than failing the request.
    pub fn features(&self) -> ResumeFeatures {
        serde_json::from_value(self.features.clone()).unwrap_or_default()
    }

    /// Decodes the stored dense vector, when one has been backfilled.
    pub fn embedding(&self) -> Option<Vec<f64>> {
        self.embedding
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

/// Wire view of a resume. Content and features are redacted for the
/// viewer before this is built.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeResponse {
    pub id: Uuid,
    pub filename: String,
    pub original_filename: String,
    pub file_size: i64,
    pub content: String,
    pub features: ResumeFeatures,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeListResponse {
    pub items: Vec<ResumeResponse>,
    pub next_offset: Option<i64>,
    pub total: i64,
}

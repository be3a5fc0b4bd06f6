use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::matching::evidence::JobSpec;

#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub location: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub company: String,
    pub created_at: DateTime<Utc>,
}

impl JobRow {
    /// Query form handed to the matching engine.
    pub fn to_spec(&self) -> JobSpec {
        JobSpec {
            title: self.title.clone(),
            description: self.description.clone(),
            requirements: self.requirements.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub location: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub company: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<JobRow> for JobResponse {
    fn from(row: JobRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            requirements: row.requirements,
            location: row.location,
            salary_min: row.salary_min,
            salary_max: row.salary_max,
            company: row.company,
            owner_id: row.owner_id,
            created_at: row.created_at,
        }
    }
}

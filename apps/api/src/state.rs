use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::config::Config;
use crate::matching::config::MatchConfig;
use crate::matching::scoring::SimilarityScorer;
use crate::privacy::Redactor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Redis client backing the sliding-window rate limiter.
    pub redis: RedisClient,
    pub s3: S3Client,
    pub config: Config,
    /// Pluggable similarity scorer. Default: LexicalScorer. Swap via SIMILARITY_STRATEGY env.
    pub scorer: Arc<dyn SimilarityScorer>,
    /// Compiled extraction patterns and vocabularies, built once at startup.
    pub match_config: Arc<MatchConfig>,
    /// Compiled PII redaction rules, built once at startup.
    pub redactor: Arc<Redactor>,
}

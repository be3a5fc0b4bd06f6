// Sliding-window rate limiting over Redis sorted sets. Keyed per user when
// the request carries a valid token, per client IP otherwise, so one
// caller cannot starve the rest. Redis being down admits requests rather
// than failing them.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use redis::AsyncCommands;
use tracing::warn;
use uuid::Uuid;

use crate::auth;
use crate::errors::AppError;
use crate::state::AppState;

const WINDOW_SECONDS: i64 = 60;

pub async fn rate_limit(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = match auth::bearer_token(req.headers())
        .and_then(|token| auth::verify_token(&state.config.auth_secret, token))
    {
        Some(user_id) => format!("rate_limit:user:{user_id}"),
        None => format!("rate_limit:ip:{}", addr.ip()),
    };

    match check_window(&state.redis, &key, state.config.rate_limit_per_minute).await {
        Ok(true) => {}
        Ok(false) => return Err(AppError::RateLimited),
        Err(e) => warn!("Rate limiter unavailable, admitting request: {e}"),
    }
    Ok(next.run(req).await)
}

/// True when the caller is still under the per-minute budget. Counts
/// requests in a sorted set scored by unix seconds, pruning entries older
/// than the window on each call.
async fn check_window(
    client: &redis::Client,
    key: &str,
    limit: i64,
) -> redis::RedisResult<bool> {
    let mut conn = client.get_multiplexed_async_connection().await?;
    let now = Utc::now().timestamp();

    let _: () = conn.zrembyscore(key, 0, now - WINDOW_SECONDS).await?;
    let count: i64 = conn.zcard(key).await?;
    if count >= limit {
        return Ok(false);
    }
    // Member must be unique per request; the score carries the timestamp.
    let _: () = conn.zadd(key, Uuid::new_v4().to_string(), now).await?;
    let _: () = conn.expire(key, WINDOW_SECONDS).await?;
    Ok(true)
}

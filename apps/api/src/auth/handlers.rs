use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{hash_password, issue_token, verify_password};
use crate::errors::AppError;
use crate::models::user::{UserResponse, UserRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_recruiter: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, AppError> {
    if !req.email.contains('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    if req.password.chars().count() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let existing: Option<UserRow> =
        sqlx::query_as("SELECT * FROM users WHERE email = $1 OR username = $2")
            .bind(&req.email)
            .bind(&req.username)
            .fetch_optional(&state.db)
            .await?;
    if let Some(user) = existing {
        let message = if user.email == req.email {
            "Email already registered"
        } else {
            "Username already taken"
        };
        return Err(AppError::Validation(message.to_string()));
    }

    // Hashing is deliberately slow; keep it off the async workers.
    let password = req.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(anyhow::Error::from)?;

    let user: UserRow = sqlx::query_as(
        "INSERT INTO users (id, email, username, password_hash, is_recruiter)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&req.email)
    .bind(&req.username)
    .bind(&password_hash)
    .bind(req.is_recruiter)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Registered user {} ({})", user.username, user.id);
    Ok(Json(UserResponse::from(user)))
}

pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&req.email)
        .fetch_optional(&state.db)
        .await?;

    let user = match user {
        Some(user) => {
            let password = req.password;
            let stored = user.password_hash.clone();
            let ok = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
                .await
                .map_err(anyhow::Error::from)?;
            ok.then_some(user).ok_or(AppError::InvalidCredentials)?
        }
        None => return Err(AppError::InvalidCredentials),
    };

    let access_token = issue_token(
        &state.config.auth_secret,
        user.id,
        state.config.token_ttl_minutes,
    )?;
    Ok(Json(TokenResponse { access_token, token_type: "bearer" }))
}

// Credentials and sessions: PBKDF2 password hashing, HS256 bearer tokens,
// and the `Viewer` extractor that handlers take as an argument.

pub mod handlers;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::privacy::Viewer;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

const PBKDF2_ITERATIONS: u32 = 100_000;
const PASSWORD_SCHEME: &str = "pbkdf2-sha256";

// ──────────────────────────────────────────────
// Passwords
// ──────────────────────────────────────────────

/// Hashes a password with PBKDF2-HMAC-SHA256 under a fresh random salt.
/// The iteration count and salt travel inside the encoded string, so the
/// cost can be raised later without invalidating stored hashes.
pub fn hash_password(password: &str) -> String {
    let salt = *Uuid::new_v4().as_bytes();
    encode_password_hash(password, &salt, PBKDF2_ITERATIONS)
}

fn encode_password_hash(password: &str, salt: &[u8], iterations: u32) -> String {
    let digest = pbkdf2_sha256(password.as_bytes(), salt, iterations);
    format!(
        "{PASSWORD_SCHEME}${iterations}${}${}",
        hex::encode(salt),
        hex::encode(digest)
    )
}

/// Checks a password against a stored hash. Any malformed stored value
/// verifies as false rather than erroring.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt_hex), Some(digest_hex), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    if scheme != PASSWORD_SCHEME {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };
    let digest = pbkdf2_sha256(password.as_bytes(), &salt, iterations);
    bool::from(digest.as_slice().ct_eq(&expected))
}

/// Single-block PBKDF2: 32 output bytes is exactly one HMAC-SHA256 block.
fn pbkdf2_sha256(password: &[u8], salt: &[u8], iterations: u32) -> [u8; 32] {
    let mut mac = hmac_keyed(password);
    mac.update(salt);
    mac.update(&1u32.to_be_bytes());
    let mut round: [u8; 32] = mac.finalize().into_bytes().into();
    let mut output = round;
    for _ in 1..iterations {
        let mut mac = hmac_keyed(password);
        mac.update(&round);
        round = mac.finalize().into_bytes().into();
        for (out_byte, round_byte) in output.iter_mut().zip(round.iter()) {
            *out_byte ^= round_byte;
        }
    }
    output
}

fn hmac_keyed(key: &[u8]) -> HmacSha256 {
    HmacSha256::new_from_slice(key).expect("HMAC can take key of any size")
}

// ──────────────────────────────────────────────
// Tokens
// ──────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    exp: i64,
}

/// Issues a signed HS256 bearer token for the user, valid for
/// `ttl_minutes` from now.
pub fn issue_token(secret: &str, user_id: Uuid, ttl_minutes: i64) -> Result<String, AppError> {
    let header = serde_json::json!({ "alg": "HS256", "typ": "JWT" });
    let claims = Claims {
        sub: user_id,
        exp: (Utc::now() + chrono::Duration::minutes(ttl_minutes)).timestamp(),
    };
    let header_b64 =
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).map_err(anyhow::Error::from)?);
    let claims_b64 =
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).map_err(anyhow::Error::from)?);
    let signing_input = format!("{header_b64}.{claims_b64}");
    let signature = sign(secret, signing_input.as_bytes());
    Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
}

/// Verifies signature and expiry, returning the subject on success.
/// All failure modes collapse to `None`; callers map that to 401.
pub fn verify_token(secret: &str, token: &str) -> Option<Uuid> {
    let mut segments = token.split('.');
    let (Some(header), Some(claims), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };
    let signing_input_len = header.len() + 1 + claims.len();
    let expected = sign(secret, token[..signing_input_len].as_bytes());
    let given = URL_SAFE_NO_PAD.decode(signature).ok()?;
    if !bool::from(given.as_slice().ct_eq(&expected)) {
        return None;
    }
    let claims: Claims = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(claims).ok()?).ok()?;
    if claims.exp < Utc::now().timestamp() {
        return None;
    }
    Some(claims.sub)
}

fn sign(secret: &str, data: &[u8]) -> [u8; 32] {
    let mut mac = hmac_keyed(secret.as_bytes());
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Pulls the bearer token out of the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Authenticated-caller extractor. Decodes the bearer token, then loads the
/// account row so `is_recruiter` reflects the database, not the token.
#[async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let user_id =
            verify_token(&state.config.auth_secret, token).ok_or(AppError::Unauthorized)?;
        let user: UserRow = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(Viewer { id: user.id, is_recruiter: user.is_recruiter })
    }
}

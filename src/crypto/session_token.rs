use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Base64url of `{"enc":"A256GCM","alg":"RSA-OAEP-256"}`.
const TOKEN_HEADER: &str = "eyJlbmMiOiJBMjU2R0NNIiwiYWxnIjoiUlNBLU9BRVAtMjU2In0";
/// Every issued token starts with this prefix.
const TOKEN_PREFIX: &str = "eyJlbmMi";
const IV_SIZE: usize = 12;
const TAG_SIZE: usize = 16;

#[derive(Serialize)]
struct TokenClaims<'a> {
    iss: &'static str,
    iat: i64,
    exp: i64,
    merchant_id: &'a str,
    session_id: Uuid,
}

fn random_segment(size: usize) -> String {
    let mut bytes = vec![0u8; size];
    OsRng.fill_bytes(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Issues a session token shaped like a compact JWE.
///
/// The token is opaque: nothing is actually encrypted and the server
/// authorizes it by store lookup only.
///
/// # Arguments
///
/// * `merchant_id` - The merchant API key embedded in the claims.
/// * `now` - Issue time.
/// * `ttl` - Lifetime recorded in the `exp` claim.
///
/// # Returns
///
/// A `Result` containing the five-segment token.
pub fn generate_session_token(merchant_id: &str, now: DateTime<Utc>, ttl: Duration) -> Result<String> {
    let claims = TokenClaims {
        iss: "yappy-commerce",
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
        merchant_id,
        session_id: Uuid::new_v4(),
    };

    let claims_json = sonic_rs::to_string(&claims)
        .map_err(|e| AppError::Internal(format!("Token claims serialization failed: {}", e)))?;
    let encrypted_key = general_purpose::URL_SAFE_NO_PAD.encode(claims_json);
    let ciphertext = general_purpose::URL_SAFE_NO_PAD
        .encode(format!("{}{}", Uuid::new_v4(), now.timestamp_millis()));

    Ok(format!(
        "{}.{}.{}.{}.{}",
        TOKEN_HEADER,
        encrypted_key,
        random_segment(IV_SIZE),
        ciphertext,
        random_segment(TAG_SIZE)
    ))
}

/// Cheap shape check run before any store lookup.
pub fn is_well_formed(token: &str) -> bool {
    token.starts_with(TOKEN_PREFIX) && token.split('.').count() >= 3
}

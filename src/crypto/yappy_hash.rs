use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Date layout mixed into the daily hash.
pub const HASH_DATE_FORMAT: &str = "%Y-%m-%d";

/// Computes the merchant authentication hash.
///
/// Lowercase hex of HMAC-SHA256 keyed with `secret_key` over `api_key || date`,
/// where `date` is `YYYY-MM-DD`.
///
/// # Arguments
///
/// * `api_key` - The merchant API key.
/// * `date` - The UTC date, formatted `YYYY-MM-DD`.
/// * `secret_key` - The merchant secret key.
///
/// # Returns
///
/// A `Result` containing the hex digest.
pub fn generate_hash(api_key: &str, date: &str, secret_key: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| AppError::Internal(format!("HMAC key rejected: {}", e)))?;
    mac.update(api_key.as_bytes());
    mac.update(date.as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// The hash valid for the UTC calendar day of `now`.
pub fn daily_hash(api_key: &str, secret_key: &str, now: DateTime<Utc>) -> Result<String> {
    let date = now.format(HASH_DATE_FORMAT).to_string();
    generate_hash(api_key, &date, secret_key)
}

/// Compares two credentials without short-circuiting on the first difference.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

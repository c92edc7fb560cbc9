//! Token service: signed, time-limited bearer tokens whose subject is the
//! user's email address. HS256 with a fixed configured secret.

use anyhow::{Result, anyhow};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use sauti_types::api::Claims;

pub fn issue_token(secret: &str, ttl_minutes: i64, subject: &str) -> Result<String> {
    let claims = Claims {
        sub: subject.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::minutes(ttl_minutes)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Returns the subject email. Fails for a bad signature, an expired token,
/// or an empty subject.
pub fn validate_token(secret: &str, token: &str) -> Result<String> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    if data.claims.sub.is_empty() {
        return Err(anyhow!("token has no subject"));
    }

    Ok(data.claims.sub)
}

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Claims carried by editor tokens. Tokens are issued by the account service;
/// this server only verifies them.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Username, recorded as `changed_by`
    pub uid: i32,
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub exp: usize,
}

/// Sign a token valid for seven days.
pub fn sign(
    user_id: i32,
    username: &str,
    role: &str,
    permissions: &[String],
    secret: &str,
) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(7))
        .context("token expiry out of range")?
        .timestamp();

    let claims = Claims {
        sub: username.to_owned(),
        uid: user_id,
        role: role.to_owned(),
        permissions: permissions.to_vec(),
        exp: expiration as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify and decode a token.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

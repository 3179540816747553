//! Password hashing and bearer tokens

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use gym_core::UserId;

/// Token lifetime: one hour
pub const TOKEN_TTL_SECS: i64 = 3600;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// The user id carried in `sub`
    pub fn user_id(&self) -> Result<UserId> {
        self.sub
            .parse()
            .with_context(|| format!("Invalid subject in token: {}", self.sub))
    }
}

/// Hash a password using argon2id
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Create an access token valid for one hour from now
pub fn create_access_token(user_id: UserId, email: &str, jwt_secret: &str) -> Result<String> {
    create_access_token_at(user_id, email, jwt_secret, chrono::Utc::now().timestamp())
}

/// Create an access token issued at `issued_at` (unix seconds)
pub fn create_access_token_at(
    user_id: UserId,
    email: &str,
    jwt_secret: &str,
    issued_at: i64,
) -> Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iat: issued_at,
        exp: issued_at + TOKEN_TTL_SECS,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .context("Failed to create access token")
}

/// Validate an access token and return claims
pub fn validate_access_token(token: &str, jwt_secret: &str) -> Result<Claims> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .context("Invalid access token")?;
    Ok(token_data.claims)
}

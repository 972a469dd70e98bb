use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{self, SecurityConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenUse {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    pub roles: Vec<String>,
    pub token_use: TokenUse,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Wrong token type")]
    WrongTokenType,
    #[error("JWT secret not configured")]
    MissingSecret,
    #[error("Token generation failed: {0}")]
    TokenGeneration(String),
    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// Signing material for both token kinds
#[derive(Debug, Clone)]
pub struct TokenKeys {
    access_secret: String,
    refresh_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenKeys {
    pub fn from_config(security: &SecurityConfig) -> Self {
        Self {
            access_secret: security.jwt_secret.clone(),
            refresh_secret: security.refresh_secret.clone(),
            access_ttl: Duration::minutes(security.access_token_ttl_minutes),
            refresh_ttl: Duration::hours(security.refresh_token_ttl_hours),
        }
    }

    pub fn global() -> Self {
        Self::from_config(&config::config().security)
    }

    fn secret(&self, token_use: TokenUse) -> Result<&str, AuthError> {
        let secret = match token_use {
            TokenUse::Access => &self.access_secret,
            TokenUse::Refresh => &self.refresh_secret,
        };
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }
        Ok(secret)
    }

    fn sign(&self, user_id: i64, email: &str, roles: &[String], token_use: TokenUse) -> Result<String, AuthError> {
        let now = Utc::now();
        let ttl = match token_use {
            TokenUse::Access => self.access_ttl,
            TokenUse::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            user_id,
            email: email.to_string(),
            roles: roles.to_vec(),
            token_use,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        let key = EncodingKey::from_secret(self.secret(token_use)?.as_bytes());
        encode(&Header::default(), &claims, &key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Mint an access/refresh pair for an officer
    pub fn issue_pair(&self, user_id: i64, email: &str, roles: &[String]) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.sign(user_id, email, roles, TokenUse::Access)?,
            refresh_token: self.sign(user_id, email, roles, TokenUse::Refresh)?,
            token_type: "Bearer",
            expires_in: self.access_ttl.num_seconds(),
        })
    }

    fn decode(&self, token: &str, expected: TokenUse) -> Result<Claims, AuthError> {
        let key = DecodingKey::from_secret(self.secret(expected)?.as_bytes());
        let data = decode::<Claims>(token, &key, &Validation::default())
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        if data.claims.token_use != expected {
            return Err(AuthError::WrongTokenType);
        }
        Ok(data.claims)
    }

    pub fn decode_access(&self, token: &str) -> Result<Claims, AuthError> {
        self.decode(token, TokenUse::Access)
    }

    pub fn decode_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        self.decode(token, TokenUse::Refresh)
    }
}

/// Hash a password with argon2id and a random salt (PHC string format)
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Constant-time check of a password against a stored PHC hash. Malformed
/// hashes never verify.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> TokenKeys {
        TokenKeys {
            access_secret: "access-test".to_string(),
            refresh_secret: "refresh-test".to_string(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::hours(168),
        }
    }

    #[test]
    fn issues_pair_with_expected_claims() {
        let keys = keys();
        let pair = keys.issue_pair(7, "admin@example.com", &["Admin".to_string()]).unwrap();
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 900);

        let claims = keys.decode_access(&pair.access_token).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.email, "admin@example.com");
        assert_eq!(claims.roles, vec!["Admin".to_string()]);
        assert_eq!(claims.exp - claims.iat, 900);

        let refresh = keys.decode_refresh(&pair.refresh_token).unwrap();
        assert_eq!(refresh.token_use, TokenUse::Refresh);
        assert_eq!(refresh.exp - refresh.iat, 7 * 24 * 3600);
    }

    #[test]
    fn token_kinds_are_not_interchangeable() {
        let keys = keys();
        let pair = keys.issue_pair(1, "a@b.c", &[]).unwrap();
        assert!(keys.decode_refresh(&pair.access_token).is_err());
        assert!(keys.decode_access(&pair.refresh_token).is_err());
    }

    #[test]
    fn rejects_tampered_tokens() {
        let keys = keys();
        let pair = keys.issue_pair(1, "a@b.c", &[]).unwrap();
        let mut other = keys.clone();
        other.access_secret = "different".to_string();
        assert!(matches!(other.decode_access(&pair.access_token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn missing_secret_is_an_error() {
        let mut keys = keys();
        keys.access_secret.clear();
        assert!(matches!(keys.issue_pair(1, "a@b.c", &[]), Err(AuthError::MissingSecret)));
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("Admin123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Admin123", &hash));
        assert!(!verify_password("admin123", &hash));
        assert!(!verify_password("Admin123", "not-a-hash"));
    }
}

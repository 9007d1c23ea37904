//! Password hashing and signed-token issuing.

use crate::configuration::AuthSettings;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum CredentialError {
    #[error("token expired")]
    Expired,
    #[error("token invalid")]
    Invalid,
    #[error("token of the wrong kind")]
    WrongKind,
    #[error("could not issue token: {0}")]
    Issue(String),
}

/// SHA-256 over `secret || salt`, lowercase hex.
pub fn hash_with_salt(secret: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(salt.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Clone)]
pub struct CredentialService {
    salt: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl CredentialService {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            salt: settings.hash_salt.clone(),
            encoding_key: EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
            access_ttl: Duration::seconds(settings.access_token_ttl_secs),
            refresh_ttl: Duration::seconds(settings.refresh_token_ttl_secs),
        }
    }

    pub fn hash(&self, secret: &str) -> String {
        hash_with_salt(secret, &self.salt)
    }

    pub fn verify(&self, secret: &str, digest: &str) -> bool {
        let computed = self.hash(secret);
        computed.len() == digest.len()
            && computed
                .bytes()
                .zip(digest.bytes())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }

    pub fn issue_token(&self, user_id: Uuid) -> Result<String, CredentialError> {
        self.issue(user_id, TokenKind::Access, self.access_ttl)
    }

    pub fn issue_refresh_token(&self, user_id: Uuid) -> Result<String, CredentialError> {
        self.issue(user_id, TokenKind::Refresh, self.refresh_ttl)
    }

    pub fn validate_token(&self, token: &str) -> Result<Uuid, CredentialError> {
        self.validate(token, TokenKind::Access)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<Uuid, CredentialError> {
        self.validate(token, TokenKind::Refresh)
    }

    fn issue(&self, user_id: Uuid, kind: TokenKind, ttl: Duration) -> Result<String, CredentialError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| CredentialError::Issue(err.to_string()))
    }

    fn validate(&self, token: &str, expected: TokenKind) -> Result<Uuid, CredentialError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => CredentialError::Expired,
                _ => CredentialError::Invalid,
            })?;

        if claims.kind != expected {
            return Err(CredentialError::WrongKind);
        }

        Uuid::parse_str(&claims.sub).map_err(|_| CredentialError::Invalid)
    }
}

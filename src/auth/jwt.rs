/// JWT Token Issue and Verification
///
/// HS256 with a shared secret. Expiry is checked here rather than by
/// `jsonwebtoken` so that a token is rejected at exactly `now >= exp`, with
/// the clock supplied by the caller in the `_at` variants.

use std::fmt;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;

use crate::auth::claims::{AccessClaims, Expiring, RefreshClaims};
use crate::configuration::JwtSettings;
use crate::domain::User;
use crate::error::AppError;

/// Why a token was refused. Only ever logged; callers answer with one
/// uniform message per token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    Malformed,
    BadSignature,
    WrongIssuer,
    Expired,
}

impl fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenRejection::Malformed => write!(f, "malformed token"),
            TokenRejection::BadSignature => write!(f, "bad signature"),
            TokenRejection::WrongIssuer => write!(f, "wrong issuer"),
            TokenRejection::Expired => write!(f, "token expired"),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenRejection {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenRejection::BadSignature,
            ErrorKind::InvalidIssuer => TokenRejection::WrongIssuer,
            ErrorKind::ExpiredSignature => TokenRejection::Expired,
            _ => TokenRejection::Malformed,
        }
    }
}

/// Signing and verification keys plus token lifetimes
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl TokenKeys {
    pub fn new(config: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            access_ttl: config.access_token_expiry,
            refresh_ttl: config.refresh_token_expiry,
        }
    }

    pub fn issue_access(&self, user: &User) -> Result<String, AppError> {
        self.issue_access_at(user, now())
    }

    pub fn issue_access_at(&self, user: &User, now: i64) -> Result<String, AppError> {
        let claims = AccessClaims::new(user.id, user.role, now, self.access_ttl, &self.issuer);
        self.sign(&claims)
    }

    pub fn issue_refresh(&self, user: &User) -> Result<String, AppError> {
        self.issue_refresh_at(user, now())
    }

    pub fn issue_refresh_at(&self, user: &User, now: i64) -> Result<String, AppError> {
        let claims = RefreshClaims::new(user.id, now, self.refresh_ttl, &self.issuer);
        self.sign(&claims)
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenRejection> {
        self.verify_access_at(token, now())
    }

    pub fn verify_access_at(&self, token: &str, now: i64) -> Result<AccessClaims, TokenRejection> {
        self.verify(token, now)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenRejection> {
        self.verify_refresh_at(token, now())
    }

    pub fn verify_refresh_at(&self, token: &str, now: i64) -> Result<RefreshClaims, TokenRejection> {
        self.verify(token, now)
    }

    fn sign<C: serde::Serialize>(&self, claims: &C) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    fn verify<C>(&self, token: &str, now: i64) -> Result<C, TokenRejection>
    where
        C: DeserializeOwned + Expiring,
    {
        let claims = decode::<C>(token, &self.decoding, &self.validation)?.claims;
        if now >= claims.exp() {
            return Err(TokenRejection::Expired);
        }
        Ok(claims)
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

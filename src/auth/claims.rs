/// JWT Claims structures
///
/// Access tokens carry the role so downstream services can authorize without
/// a lookup; refresh tokens carry only the subject.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserRole;

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    pub role: UserRole,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    pub iss: String,
}

/// JWT Claims for refresh tokens
///
/// Unknown fields are refused so an access token cannot stand in for one.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RefreshClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl AccessClaims {
    pub fn new(user_id: Uuid, role: UserRole, now: i64, expiry_seconds: i64, issuer: &str) -> Self {
        Self {
            sub: user_id.to_string(),
            role,
            iat: now,
            exp: now + expiry_seconds,
            iss: issuer.to_string(),
        }
    }

    /// `None` when the subject is not a UUID
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

impl RefreshClaims {
    pub fn new(user_id: Uuid, now: i64, expiry_seconds: i64, issuer: &str) -> Self {
        Self {
            sub: user_id.to_string(),
            iat: now,
            exp: now + expiry_seconds,
            iss: issuer.to_string(),
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// Gives the verifier uniform access to the expiry of either token kind
pub trait Expiring {
    fn exp(&self) -> i64;
}

impl Expiring for AccessClaims {
    fn exp(&self) -> i64 {
        self.exp
    }
}

impl Expiring for RefreshClaims {
    fn exp(&self) -> i64 {
        self.exp
    }
}

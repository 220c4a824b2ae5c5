/// Password Hashing and Verification
///
/// bcrypt with a per-hash random salt. Both operations are CPU bound, so the
/// async wrappers move them onto actix's blocking thread pool.

use actix_web::web;
use bcrypt::DEFAULT_COST;

use crate::error::AppError;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash_blocking(&self, password: &str) -> Result<String, AppError> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// `Ok(false)` for a wrong password; `Err` only when the stored hash is unusable
    pub fn verify_blocking(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        bcrypt::verify(password, hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
    }

    pub async fn hash(&self, password: String) -> Result<String, AppError> {
        let hasher = *self;
        web::block(move || hasher.hash_blocking(&password)).await?
    }

    pub async fn verify(&self, password: String, hash: String) -> Result<bool, AppError> {
        let hasher = *self;
        web::block(move || hasher.verify_blocking(&password, &hash)).await?
    }
}

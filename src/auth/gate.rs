/// Authentication gate
///
/// Turns an `Authorization: Bearer <token>` header into the user it belongs
/// to. The middleware in `crate::middleware` runs it before every protected
/// handler and stores the result as [`AuthenticatedUser`].

use std::ops::Deref;
use std::sync::Arc;

use crate::auth::jwt::TokenKeys;
use crate::domain::User;
use crate::error::{AppError, AuthError};
use crate::store::UserRepository;

/// The caller resolved by the gate, available to handlers through
/// `web::ReqData<AuthenticatedUser>`
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl Deref for AuthenticatedUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

#[derive(Clone)]
pub struct AuthGate {
    tokens: Arc<TokenKeys>,
    users: Arc<dyn UserRepository>,
}

impl AuthGate {
    pub fn new(tokens: Arc<TokenKeys>, users: Arc<dyn UserRepository>) -> Self {
        Self { tokens, users }
    }

    /// Resolve the raw `Authorization` header value to a user
    pub async fn authenticate(&self, header: Option<&str>) -> Result<AuthenticatedUser, AppError> {
        let token = header
            .and_then(bearer_token)
            .ok_or(AuthError::MissingAccessToken)?;

        let claims = self.tokens.verify_access(token).map_err(|reason| {
            tracing::warn!(reason = %reason, "Access token rejected");
            AuthError::InvalidAccessToken
        })?;

        let user_id = claims.user_id().ok_or_else(|| {
            tracing::warn!("Access token subject is not a user id");
            AuthError::InvalidAccessToken
        })?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::SessionUserMissing)?;

        tracing::debug!(user_id = %user.id, "Access token validated");
        Ok(AuthenticatedUser(user))
    }
}

/// The token part of a `Bearer <token>` header; `None` for any other scheme
/// or an empty token
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::JwtSettings;
    use crate::domain::{NewUser, UserRole};
    use crate::store::Repositories;

    fn keys(secret: &str) -> Arc<TokenKeys> {
        Arc::new(TokenKeys::new(&JwtSettings {
            secret: secret.to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
            issuer: "test".to_string(),
        }))
    }

    async fn gate_with_user() -> (AuthGate, User) {
        let repositories = Repositories::in_memory();
        let user = repositories
            .users
            .create(NewUser {
                name: "A".to_string(),
                email: "a@x.com".to_string(),
                password_hash: "hash".to_string(),
                role: UserRole::Member,
            })
            .await
            .unwrap();
        let gate = AuthGate::new(keys("test-secret-key-at-least-32-characters-long"), repositories.users);
        (gate, user)
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("bearer abc"), None);
        // only a single space separates the scheme from the token
        assert_eq!(bearer_token("Bearer  abc"), Some(" abc"));
    }

    #[actix_web::test]
    async fn padded_token_is_forbidden() {
        let (gate, user) = gate_with_user().await;
        let token = gate.tokens.issue_access(&user).unwrap();

        let err = gate
            .authenticate(Some(&format!("Bearer  {}", token)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::InvalidAccessToken)));
    }

    #[actix_web::test]
    async fn valid_token_resolves_the_user() {
        let (gate, user) = gate_with_user().await;
        let token = gate.tokens.issue_access(&user).unwrap();

        let authenticated = gate
            .authenticate(Some(&format!("Bearer {}", token)))
            .await
            .unwrap();
        assert_eq!(authenticated.id, user.id);
    }

    #[actix_web::test]
    async fn missing_header_is_unauthorized() {
        let (gate, _) = gate_with_user().await;

        for header in [None, Some("Token abc"), Some("Bearer ")] {
            let err = gate.authenticate(header).await.unwrap_err();
            assert!(matches!(err, AppError::Auth(AuthError::MissingAccessToken)));
        }
    }

    #[actix_web::test]
    async fn foreign_token_is_forbidden() {
        let (gate, user) = gate_with_user().await;
        let token = keys("another-secret-key-at-least-32-characters")
            .issue_access(&user)
            .unwrap();

        let err = gate
            .authenticate(Some(&format!("Bearer {}", token)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::InvalidAccessToken)));
    }

    #[actix_web::test]
    async fn token_for_deleted_user_is_forbidden() {
        let (gate, mut user) = gate_with_user().await;
        user.id = uuid::Uuid::new_v4();
        let token = gate.tokens.issue_access(&user).unwrap();

        let err = gate
            .authenticate(Some(&format!("Bearer {}", token)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::SessionUserMissing)));
    }
}

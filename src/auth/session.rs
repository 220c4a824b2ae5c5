/// Session lifecycle
///
/// Registration, login, access-token refresh and logout. Tokens are
/// stateless: the refresh token lives only in the `refreshToken` cookie and
/// logout is a cookie removal, nothing is recorded server side.

use std::sync::Arc;

use actix_web::cookie::{time::Duration, Cookie, SameSite};

use crate::audit::{AuditAction, AuditEvent};
use crate::auth::jwt::TokenKeys;
use crate::auth::password::PasswordHasher;
use crate::configuration::Environment;
use crate::domain::{normalize_email, NewUser, User, UserRole};
use crate::error::{AppError, AuthError, DatabaseError};
use crate::store::UserRepository;

pub const REFRESH_COOKIE_NAME: &str = "refreshToken";
/// Cookie lifetime for an ordinary login
pub const SESSION_COOKIE_DAYS: i64 = 7;
/// Cookie lifetime when the caller asked to be remembered
pub const REMEMBER_ME_COOKIE_DAYS: i64 = 30;

const DUPLICATE_EMAIL: &str = "User with this email already exists.";

/// Validated registration input
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Validated login input
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

/// Result of a successful login
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_cookie: Cookie<'static>,
}

pub struct SessionManager {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenKeys>,
    hasher: PasswordHasher,
    secure_cookies: bool,
}

impl SessionManager {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<TokenKeys>,
        hasher: PasswordHasher,
        environment: Environment,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
            secure_cookies: environment.is_production(),
        }
    }

    #[tracing::instrument(name = "Registering user", skip(self, registration))]
    pub async fn register(&self, registration: Registration) -> Result<User, AppError> {
        let email = normalize_email(&registration.email);

        if self.users.find_by_email(&email).await?.is_some() {
            AuditEvent::failure(AuditAction::Register, "user", "Email already registered").emit();
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }

        let password_hash = self.hasher.hash(registration.password).await?;

        // a concurrent registration can still win between the lookup and the insert
        let user = self
            .users
            .create(NewUser {
                name: registration.name,
                email,
                password_hash,
                role: UserRole::Member,
            })
            .await
            .map_err(|e| match e {
                DatabaseError::UniqueConstraintViolation(_) => {
                    AppError::Conflict(DUPLICATE_EMAIL.to_string())
                }
                other => AppError::from(other),
            })?;

        AuditEvent::success(AuditAction::Register, "user", "User registered")
            .with_user_id(user.id)
            .emit();
        Ok(user)
    }

    #[tracing::instrument(name = "Logging in", skip(self, credentials))]
    pub async fn login(&self, credentials: Credentials) -> Result<LoginOutcome, AppError> {
        let email = normalize_email(&credentials.email);

        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                AuditEvent::failure(AuditAction::Login, "session", "Unknown email").emit();
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let matches = self
            .hasher
            .verify(credentials.password, user.password_hash.clone())
            .await?;
        if !matches {
            AuditEvent::failure(AuditAction::Login, "session", "Wrong password")
                .with_user_id(user.id)
                .emit();
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = self.tokens.issue_access(&user)?;
        let refresh_token = self.tokens.issue_refresh(&user)?;
        let refresh_cookie = self.refresh_cookie(refresh_token, credentials.remember_me);

        AuditEvent::success(AuditAction::Login, "session", "User logged in")
            .with_user_id(user.id)
            .emit();
        Ok(LoginOutcome {
            user,
            access_token,
            refresh_cookie,
        })
    }

    /// Mint a new access token from the refresh cookie value. The refresh
    /// token itself is not rotated.
    #[tracing::instrument(name = "Refreshing access token", skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<String, AppError> {
        let token = match refresh_token {
            Some(token) if !token.is_empty() => token,
            _ => return Err(AuthError::MissingRefreshToken.into()),
        };

        let claims = self.tokens.verify_refresh(token).map_err(|reason| {
            tracing::warn!(reason = %reason, "Refresh token rejected");
            AuditEvent::failure(AuditAction::RefreshToken, "session", reason.to_string()).emit();
            AuthError::RefreshTokenRejected
        })?;

        let user_id = claims.user_id().ok_or_else(|| {
            tracing::warn!("Refresh token subject is not a user id");
            AuthError::RefreshTokenRejected
        })?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::RefreshUserMissing)?;

        let access_token = self.tokens.issue_access(&user)?;
        AuditEvent::success(AuditAction::RefreshToken, "session", "Access token refreshed")
            .with_user_id(user.id)
            .emit();
        Ok(access_token)
    }

    /// Removal cookie carrying the same flags as the one set at login
    pub fn logout_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.base_cookie(String::new());
        cookie.make_removal();
        cookie
    }

    pub fn refresh_cookie(&self, token: String, remember_me: bool) -> Cookie<'static> {
        let days = if remember_me {
            REMEMBER_ME_COOKIE_DAYS
        } else {
            SESSION_COOKIE_DAYS
        };
        let mut cookie = self.base_cookie(token);
        cookie.set_max_age(Duration::days(days));
        cookie
    }

    fn base_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build(REFRESH_COOKIE_NAME, value)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.secure_cookies)
            .finish()
    }
}

/// Authentication Routes
///
/// Registration, login, access-token refresh and logout. Request bodies are
/// validated here; the session decisions live in `SessionManager`.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{
    AuthenticatedUser, Credentials, Registration, SessionManager, REFRESH_COOKIE_NAME,
};
use crate::domain::UserProfile;
use crate::audit::{AuditAction, AuditEvent};
use crate::error::{AppError, ValidationError};
use crate::response::ApiResponse;
use crate::validators::{
    is_valid_email, is_valid_name, is_valid_password, required, ValidationReport,
};

/// User registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// User login request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub remember_me: bool,
}

/// Body of login and refresh responses
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

impl RegisterRequest {
    fn validate(&self) -> Result<Registration, AppError> {
        let mut report = ValidationReport::new();
        let name = report.check(
            required("Name", self.name.as_deref()).and_then(|name| is_valid_name("Name", name)),
        );
        let email = report.check(
            required("Email", self.email.as_deref()).and_then(is_valid_email),
        );
        let password = report.check(is_valid_password(self.password.as_deref()));

        match (name, email, password) {
            (Some(name), Some(email), Some(password)) => Ok(Registration {
                name,
                email,
                password,
            }),
            _ => Err(report.into_error().into()),
        }
    }
}

impl LoginRequest {
    fn validate(&self) -> Result<Credentials, AppError> {
        let mut report = ValidationReport::new();
        let email = report.check(
            required("Email", self.email.as_deref()).and_then(is_valid_email),
        );
        // login checks presence only; length rules apply at registration
        let password = report.check(match self.password.as_deref() {
            Some(p) if !p.is_empty() => Ok(p.to_string()),
            _ => Err(ValidationError::Required("Password")),
        });

        match (email, password) {
            (Some(email), Some(password)) => Ok(Credentials {
                email,
                password,
                remember_me: self.remember_me,
            }),
            _ => Err(report.into_error().into()),
        }
    }
}

/// POST /api/auth/register
///
/// # Errors
/// - 400: Validation errors (missing name, invalid email, short password)
/// - 400: Email already registered
pub async fn register(
    form: web::Json<RegisterRequest>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let registration = form.validate()?;
    let user = sessions.register(registration).await?;

    tracing::info!(user_id = %user.id, "User registered successfully");

    Ok(HttpResponse::Created().json(ApiResponse::success(
        "User registered successfully",
        UserProfile::from(&user),
    )))
}

/// POST /api/auth/login
///
/// Returns the access token in the body and the refresh token as an
/// HttpOnly cookie.
///
/// # Errors
/// - 400: Validation errors
/// - 400: Invalid credentials (unknown email and wrong password alike)
pub async fn login(
    form: web::Json<LoginRequest>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let credentials = form.validate()?;
    let outcome = sessions.login(credentials).await?;

    tracing::info!(user_id = %outcome.user.id, "User logged in successfully");

    Ok(HttpResponse::Ok()
        .cookie(outcome.refresh_cookie)
        .json(ApiResponse::success(
            "Login successful",
            AccessTokenResponse {
                access_token: outcome.access_token,
            },
        )))
}

/// POST /api/auth/refresh
///
/// Reads the refresh token from the cookie only.
pub async fn refresh(
    req: HttpRequest,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let cookie = req.cookie(REFRESH_COOKIE_NAME);
    let access_token = sessions
        .refresh(cookie.as_ref().map(|c| c.value()))
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Token refreshed",
        AccessTokenResponse { access_token },
    )))
}

/// POST /api/auth/logout
pub async fn logout(
    user: web::ReqData<AuthenticatedUser>,
    sessions: web::Data<SessionManager>,
) -> HttpResponse {
    AuditEvent::success(AuditAction::Logout, "session", "Refresh cookie cleared")
        .with_user_id(user.id)
        .emit();

    HttpResponse::Ok()
        .cookie(sessions.logout_cookie())
        .json(ApiResponse::done("Logged out successfully"))
}

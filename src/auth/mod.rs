/// Authentication module
///
/// Handles password hashing, JWT issue/verification, the session lifecycle
/// and the gate that resolves bearer tokens to users.

mod claims;
mod gate;
mod jwt;
mod password;
mod session;

pub use claims::{AccessClaims, RefreshClaims};
pub use gate::{bearer_token, AuthGate, AuthenticatedUser};
pub use jwt::{TokenKeys, TokenRejection};
pub use password::PasswordHasher;
pub use session::{
    Credentials, LoginOutcome, Registration, SessionManager, REFRESH_COOKIE_NAME,
    REMEMBER_ME_COOKIE_DAYS, SESSION_COOKIE_DAYS,
};

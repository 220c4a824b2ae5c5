/// Input validators
/// Features:
/// 1. DoS Protection: Input length limits
/// 2. Email format validation
/// 3. Control-character rejection for free text
/// 4. Error collection so a request reports every failing field at once

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MAX_LOCAL_PART_LENGTH: usize = 64;
const MAX_TEXT_LENGTH: usize = 256;
pub const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_PASSWORD_LENGTH: usize = 128;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
    ).unwrap();
}

/// Collects validation failures across the fields of one request
#[derive(Debug, Default)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the failure (if any) and hand back the value on success
    pub fn check<T>(&mut self, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.errors.push(e);
                None
            }
        }
    }

    pub fn into_error(mut self) -> ValidationError {
        if self.errors.len() == 1 {
            self.errors.remove(0)
        } else {
            ValidationError::Multiple(self.errors)
        }
    }
}

/// Returns the trimmed value, or `Required(label)` when absent or blank
pub fn required<'a>(label: &'static str, value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::Required(label)),
    }
}

/// Trimmed optional text; blank counts as absent
pub fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validates email address
/// - Checks format using RFC 5322 simplified regex
/// - Verifies length constraints
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Required("Email"));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("Email", MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) || has_suspicious_email_patterns(trimmed) {
        return Err(ValidationError::InvalidFormat("email"));
    }

    Ok(trimmed.to_string())
}

/// Validates a display name (user, event or participant)
/// - Checks length constraints
/// - Rejects control characters
pub fn is_valid_name(label: &'static str, name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Required(label));
    }

    if trimmed.chars().count() > MAX_TEXT_LENGTH {
        return Err(ValidationError::TooLong(label, MAX_TEXT_LENGTH));
    }

    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::SuspiciousContent(label));
    }

    Ok(trimmed.to_string())
}

/// Validates a password for registration. Passwords are not trimmed.
pub fn is_valid_password(password: Option<&str>) -> Result<String, ValidationError> {
    let password = match password {
        Some(p) if !p.is_empty() => p,
        _ => return Err(ValidationError::Required("Password")),
    };

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort("Password", MIN_PASSWORD_LENGTH));
    }

    // bcrypt only looks at the first 72 bytes; the cap keeps hashing cheap
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("Password", MAX_PASSWORD_LENGTH));
    }

    Ok(password.to_string())
}

fn has_suspicious_email_patterns(email: &str) -> bool {
    if let Some(at_pos) = email.find('@') {
        if at_pos > MAX_LOCAL_PART_LENGTH {
            return true;
        }
    }

    email.matches('@').count() != 1 || email.contains('\0')
}

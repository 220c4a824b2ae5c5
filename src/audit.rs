/// Audit trail
///
/// Security-relevant outcomes (account creation, logins, token refreshes,
/// logouts, destructive changes) are written as structured `tracing` events
/// under the `audit` target so they can be routed separately from the
/// request log.

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Register,
    Login,
    RefreshToken,
    Logout,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
    ReplaceParticipants,
    DeleteParticipant,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Register => "REGISTER",
            AuditAction::Login => "LOGIN",
            AuditAction::RefreshToken => "REFRESH_TOKEN",
            AuditAction::Logout => "LOGOUT",
            AuditAction::CreateEvent => "CREATE_EVENT",
            AuditAction::UpdateEvent => "UPDATE_EVENT",
            AuditAction::DeleteEvent => "DELETE_EVENT",
            AuditAction::ReplaceParticipants => "REPLACE_PARTICIPANTS",
            AuditAction::DeleteParticipant => "DELETE_PARTICIPANT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOutcome {
    Success,
    Failure,
}

/// One audit trail entry
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub log_id: Uuid,
    pub action: AuditAction,
    pub outcome: AuditOutcome,
    pub resource_type: &'static str,
    pub resource_id: Option<String>,
    pub user_id: Option<Uuid>,
    pub message: String,
}

impl AuditEvent {
    pub fn success(action: AuditAction, resource_type: &'static str, message: impl Into<String>) -> Self {
        Self::new(action, AuditOutcome::Success, resource_type, message)
    }

    pub fn failure(action: AuditAction, resource_type: &'static str, message: impl Into<String>) -> Self {
        Self::new(action, AuditOutcome::Failure, resource_type, message)
    }

    fn new(
        action: AuditAction,
        outcome: AuditOutcome,
        resource_type: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            log_id: Uuid::new_v4(),
            action,
            outcome,
            resource_type,
            resource_id: None,
            user_id: None,
            message: message.into(),
        }
    }

    pub fn with_resource_id(mut self, id: impl ToString) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    pub fn with_user_id(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Write the entry; failures at `warn`, successes at `info`
    pub fn emit(&self) {
        match self.outcome {
            AuditOutcome::Failure => tracing::warn!(
                target: "audit",
                log_id = %self.log_id,
                action = self.action.as_str(),
                resource_type = self.resource_type,
                resource_id = ?self.resource_id,
                user_id = ?self.user_id,
                status = "FAILURE",
                detail = %self.message,
                "Audit log entry"
            ),
            AuditOutcome::Success => tracing::info!(
                target: "audit",
                log_id = %self.log_id,
                action = self.action.as_str(),
                resource_type = self.resource_type,
                resource_id = ?self.resource_id,
                user_id = ?self.user_id,
                status = "SUCCESS",
                detail = %self.message,
                "Audit log entry"
            ),
        }
    }
}

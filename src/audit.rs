/// Audit trail for security-relevant actions (logins, department changes).
///
/// Entries are emitted as structured `tracing` events; successes at
/// `info`, failures at `warn`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    Success,
    Failure,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Success => "SUCCESS",
            AuditStatus::Failure => "FAILURE",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuditLog {
    pub log_id: String,
    pub timestamp: DateTime<Utc>,
    /// LOGIN, REFRESH_TOKEN, CREATE, DELETE, ...
    pub action: String,
    /// token, department, ...
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub username: Option<String>,
    pub status: AuditStatus,
    pub message: String,
}

impl AuditLog {
    pub fn new(
        action: impl Into<String>,
        resource_type: impl Into<String>,
        status: AuditStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            log_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            action: action.into(),
            resource_type: resource_type.into(),
            resource_id: None,
            username: None,
            status,
            message: message.into(),
        }
    }

    pub fn with_resource_id(mut self, id: impl ToString) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn record(&self) {
        match self.status {
            AuditStatus::Failure => tracing::warn!(
                log_id = %self.log_id,
                action = %self.action,
                resource_type = %self.resource_type,
                resource_id = ?self.resource_id,
                username = ?self.username,
                status = self.status.as_str(),
                message = %self.message,
                "Audit log entry"
            ),
            AuditStatus::Success => tracing::info!(
                log_id = %self.log_id,
                action = %self.action,
                resource_type = %self.resource_type,
                resource_id = ?self.resource_id,
                username = ?self.username,
                status = self.status.as_str(),
                message = %self.message,
                "Audit log entry"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_log_creation() {
        let entry = AuditLog::new("DELETE", "department", AuditStatus::Failure, "has children")
            .with_resource_id(7)
            .with_username("admin");

        assert_eq!(entry.action, "DELETE");
        assert_eq!(entry.resource_type, "department");
        assert_eq!(entry.resource_id.as_deref(), Some("7"));
        assert_eq!(entry.username.as_deref(), Some("admin"));
        assert_eq!(entry.status, AuditStatus::Failure);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(AuditStatus::Success).unwrap();
        assert_eq!(json, "SUCCESS");
    }
}

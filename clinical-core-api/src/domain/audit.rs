use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::resource::{RequestOrigin, ResourceType};

/// Kinds of events the audit trail records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "audit_event_kind", rename_all = "snake_case"))]
pub enum AuditEventKind {
    DataAccess,
    DataModification,
    DataDeletion,
    DataExport,
    DataAnonymization,
    ConsentGranted,
    ConsentRevoked,
    LoginSuccess,
    LoginFailure,
    AccessDenied,
    AccountDeletionScheduled,
    InactivityNotice,
    RoleChanged,
}

impl AuditEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventKind::DataAccess => "data_access",
            AuditEventKind::DataModification => "data_modification",
            AuditEventKind::DataDeletion => "data_deletion",
            AuditEventKind::DataExport => "data_export",
            AuditEventKind::DataAnonymization => "data_anonymization",
            AuditEventKind::ConsentGranted => "consent_granted",
            AuditEventKind::ConsentRevoked => "consent_revoked",
            AuditEventKind::LoginSuccess => "login_success",
            AuditEventKind::LoginFailure => "login_failure",
            AuditEventKind::AccessDenied => "access_denied",
            AuditEventKind::AccountDeletionScheduled => "account_deletion_scheduled",
            AuditEventKind::InactivityNotice => "inactivity_notice",
            AuditEventKind::RoleChanged => "role_changed",
        }
    }
}

/// One event handed to the recorder. The store assigns the monotonic
/// sequence number on append.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// None for unauthenticated events (failed logins, anonymous denials).
    pub principal_id: Option<Uuid>,
    pub kind: AuditEventKind,
    pub resource_type: Option<ResourceType>,
    pub resource_id: Option<Uuid>,
    pub origin: RequestOrigin,
    /// Structured detail: before/after diffs for modifications, the deny
    /// reason for denials, the consent category for consent changes.
    pub detail: serde_json::Value,
}

impl AuditEvent {
    pub fn new(kind: AuditEventKind, origin: RequestOrigin) -> Self {
        Self {
            principal_id: None,
            kind,
            resource_type: None,
            resource_id: None,
            origin,
            detail: serde_json::Value::Null,
        }
    }

    pub fn by(mut self, principal_id: Uuid) -> Self {
        self.principal_id = Some(principal_id);
        self
    }

    pub fn on(mut self, resource_type: ResourceType, resource_id: Uuid) -> Self {
        self.resource_type = Some(resource_type);
        self.resource_id = Some(resource_id);
        self
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = detail;
        self
    }

    /// Before/after snapshot for state-changing events. Create passes
    /// `(None, Some(after))`, delete `(Some(before), None)`.
    pub fn with_diff(self, before: Option<serde_json::Value>, after: Option<serde_json::Value>) -> Self {
        self.with_detail(serde_json::json!({
            "before": before,
            "after": after,
        }))
    }
}

/// A persisted, immutable audit entry. There is no update or delete path
/// for these anywhere in the workspace; retention is a minimum of five
/// years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    /// Monotonic insertion order, assigned by the store. Per-principal
    /// creation order is preserved under this sequence even when
    /// wall-clock timestamps tie.
    pub sequence: i64,
    pub principal_id: Option<Uuid>,
    pub kind: AuditEventKind,
    pub resource_type: Option<ResourceType>,
    pub resource_id: Option<Uuid>,
    pub recorded_at: DateTime<Utc>,
    pub origin_ip: String,
    pub client_identifier: String,
    pub detail: serde_json::Value,
}

/// Filters for compliance queries over the trail. All optional; results
/// are always newest-first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditFilter {
    pub principal_id: Option<Uuid>,
    pub kind: Option<AuditEventKind>,
    pub resource_type: Option<ResourceType>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl AuditFilter {
    pub fn for_principal(principal_id: Uuid) -> Self {
        Self {
            principal_id: Some(principal_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(principal_id) = self.principal_id {
            if entry.principal_id != Some(principal_id) {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if entry.kind != kind {
                return false;
            }
        }
        if let Some(resource_type) = self.resource_type {
            if entry.resource_type != Some(resource_type) {
                return false;
            }
        }
        if let Some(from) = self.from {
            if entry.recorded_at < from {
                return false;
            }
        }
        if let Some(until) = self.until {
            if entry.recorded_at > until {
                return false;
            }
        }
        true
    }
}

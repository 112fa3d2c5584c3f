use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::Role;

/// An authenticated actor.
///
/// `token_generation` is the rotation marker for session tokens: bumping
/// it (on password change) invalidates every previously issued token for
/// this principal without a blacklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
    pub email: String,
    pub display_name: String,
    /// Salted blake3 hash, `v1$<salt-hex>$<hash-hex>`.
    pub credential_hash: String,
    pub token_generation: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when the principal has requested account deletion; the sweep
    /// executes it once the date passes.
    pub deletion_scheduled_for: Option<DateTime<Utc>>,
    /// Last time the inactivity scan notified this account. Guards the
    /// scan against double-notifying within one cadence.
    pub inactivity_notified_at: Option<DateTime<Utc>>,
    /// Once anonymized the record is retained only to anchor compliance
    /// history; it can no longer authenticate.
    pub anonymized: bool,
}

impl Principal {
    pub fn new(role: Role, email: impl Into<String>, display_name: impl Into<String>, credential_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            role,
            email: email.into(),
            display_name: display_name.into(),
            credential_hash,
            token_generation: 0,
            created_at: now,
            updated_at: now,
            deletion_scheduled_for: None,
            inactivity_notified_at: None,
            anonymized: false,
        }
    }

    pub fn deletion_scheduled(&self) -> bool {
        self.deletion_scheduled_for.is_some()
    }
}

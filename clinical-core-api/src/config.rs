use std::time::Duration;

use crate::error::{ApiError, ApiResult};

/// Runtime configuration for the core services. Constructed explicitly
/// (from the environment or by hand) and injected into each service; no
/// ambient globals.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// HMAC key for session tokens. Rotating it invalidates every
    /// outstanding token for all principals.
    pub token_secret: Vec<u8>,
    /// Session token lifetime, fixed at issuance.
    pub token_ttl: Duration,
    /// Grace period between a deletion request and its execution.
    pub deletion_grace: Duration,
    /// Statutory retention for medical records; supersedes deletion
    /// requests for clinical content.
    pub medical_retention: Duration,
    /// Bound on every store round trip made from an authorization or
    /// audit path.
    pub store_timeout: Duration,
    /// Window of audit history included in a personal-data export.
    pub export_audit_window: Duration,
    /// Accounts idle longer than this are flagged by the inactivity scan.
    pub inactivity_threshold: Duration,
}

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

impl CoreConfig {
    /// Defaults from the compliance requirements: 7-day tokens, 30-day
    /// deletion grace, 20-year medical retention, 90-day export window.
    pub fn new(token_secret: Vec<u8>) -> Self {
        Self {
            token_secret,
            token_ttl: 7 * DAY,
            deletion_grace: 30 * DAY,
            medical_retention: 20 * 365 * DAY,
            store_timeout: Duration::from_millis(2_000),
            export_audit_window: 90 * DAY,
            inactivity_threshold: 730 * DAY,
        }
    }

    /// Read configuration from the environment. `CLINICAL_CORE_SECRET` is
    /// required; the rest fall back to the defaults above.
    pub fn from_env() -> ApiResult<Self> {
        let secret = std::env::var("CLINICAL_CORE_SECRET")
            .map_err(|_| ApiError::System("CLINICAL_CORE_SECRET is not set".to_string()))?;
        let mut config = Self::new(secret.into_bytes());

        if let Some(days) = read_u64("CLINICAL_CORE_TOKEN_TTL_DAYS")? {
            config.token_ttl = Duration::from_secs(days * DAY.as_secs());
        }
        if let Some(days) = read_u64("CLINICAL_CORE_DELETION_GRACE_DAYS")? {
            config.deletion_grace = Duration::from_secs(days * DAY.as_secs());
        }
        if let Some(millis) = read_u64("CLINICAL_CORE_STORE_TIMEOUT_MS")? {
            config.store_timeout = Duration::from_millis(millis);
        }
        Ok(config)
    }

    /// Generate a random 32-byte token secret, for first-boot setup and
    /// tests.
    pub fn generate_secret() -> Vec<u8> {
        use rand::RngCore;
        let mut secret = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        secret
    }
}

fn read_u64(name: &str) -> ApiResult<Option<u64>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ApiError::System(format!("{name} must be an integer, got {raw:?}"))),
        Err(_) => Ok(None),
    }
}

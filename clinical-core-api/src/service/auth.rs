//! Authentication: credential hashing, login, password change (which
//! rotates the token generation) and the audited admin role update.

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::domain::{
    AuditEvent, AuditEventKind, LoginRequest, Principal, RegisterRequest, RequestOrigin,
    ResourceType, Role,
};
use crate::error::{ApiError, ApiResult, AuthenticationError};
use crate::store::PrincipalStore;

use super::audit_trail::AuditTrailRecorder;
use super::token::TokenService;

/// Salted blake3, stored as `v1$<salt-hex>$<hash-hex>`.
pub fn hash_credential(password: &str) -> String {
    use rand::RngCore;
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt_hex = hex(&salt);
    let digest = salted_digest(&salt_hex, password);
    format!("v1${salt_hex}${digest}")
}

/// Constant-shape check against a stored hash. Unknown formats verify as
/// false rather than erroring.
pub fn verify_credential(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("v1"), Some(salt_hex), Some(digest)) => {
            salted_digest(salt_hex, password) == digest
        }
        _ => false,
    }
}

fn salted_digest(salt_hex: &str, password: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hasher.finalize().to_hex().to_string()
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub struct AuthService {
    principals: Arc<dyn PrincipalStore>,
    tokens: Arc<TokenService>,
    recorder: AuditTrailRecorder,
}

impl AuthService {
    pub fn new(
        principals: Arc<dyn PrincipalStore>,
        tokens: Arc<TokenService>,
        recorder: AuditTrailRecorder,
    ) -> Self {
        Self {
            principals,
            tokens,
            recorder,
        }
    }

    /// Register a patient account. Other roles are provisioned by an
    /// admin through a separate, audited path.
    pub async fn register(&self, request: RegisterRequest, origin: &RequestOrigin) -> ApiResult<Principal> {
        request.validate()?;
        if self
            .principals
            .find_by_email(&request.email)
            .await
            .map_err(|e| ApiError::System(format!("principal lookup failed: {e}")))?
            .is_some()
        {
            return Err(ApiError::Conflict("email already registered".to_string()));
        }

        let principal = Principal::new(
            Role::Patient,
            request.email,
            request.display_name,
            hash_credential(&request.password),
        );
        self.principals
            .create(&principal)
            .await
            .map_err(|e| ApiError::System(format!("principal create failed: {e}")))?;

        self.recorder
            .record(
                AuditEvent::new(AuditEventKind::DataModification, origin.clone())
                    .by(principal.id)
                    .on(ResourceType::Account, principal.id)
                    .with_detail(serde_json::json!({"action": "register"})),
            )
            .await;
        Ok(principal)
    }

    /// Authenticate and issue a session token. Both outcomes are audited;
    /// a failed attempt carries a null principal when the email is
    /// unknown, and the caller always gets the same generic error.
    pub async fn login(&self, request: LoginRequest, origin: &RequestOrigin) -> ApiResult<String> {
        request.validate()?;
        let principal = self
            .principals
            .find_by_email(&request.email)
            .await
            .map_err(|e| ApiError::System(format!("principal lookup failed: {e}")))?;

        let principal = match principal {
            Some(p) if !p.anonymized && verify_credential(&request.password, &p.credential_hash) => p,
            other => {
                self.recorder
                    .record({
                        let mut event =
                            AuditEvent::new(AuditEventKind::LoginFailure, origin.clone())
                                .with_detail(serde_json::json!({"email": request.email}));
                        if let Some(p) = other {
                            event = event.by(p.id);
                        }
                        event
                    })
                    .await;
                return Err(ApiError::Authentication(AuthenticationError::BadCredentials));
            }
        };

        let token = self.tokens.issue(&principal);
        self.recorder
            .record(
                AuditEvent::new(AuditEventKind::LoginSuccess, origin.clone())
                    .by(principal.id)
                    .on(ResourceType::Account, principal.id),
            )
            .await;
        Ok(token)
    }

    /// Change the password and bump the rotation marker, invalidating
    /// every outstanding token for the principal.
    pub async fn change_password(
        &self,
        principal_id: Uuid,
        current_password: &str,
        new_password: &str,
        origin: &RequestOrigin,
    ) -> ApiResult<()> {
        if new_password.len() < 8 {
            return Err(ApiError::Validation {
                field: "password".to_string(),
                message: "must be at least 8 characters".to_string(),
            });
        }
        let mut principal = self.load(principal_id).await?;
        if !verify_credential(current_password, &principal.credential_hash) {
            return Err(ApiError::Authentication(AuthenticationError::BadCredentials));
        }

        principal.credential_hash = hash_credential(new_password);
        principal.token_generation += 1;
        principal.updated_at = chrono::Utc::now();
        self.principals
            .update(&principal)
            .await
            .map_err(|e| ApiError::System(format!("principal update failed: {e}")))?;

        self.recorder
            .record(
                AuditEvent::new(AuditEventKind::DataModification, origin.clone())
                    .by(principal.id)
                    .on(ResourceType::Account, principal.id)
                    .with_detail(serde_json::json!({"action": "password_change"})),
            )
            .await;
        Ok(())
    }

    /// Admin-initiated role change. The only mutation path for a role
    /// after registration, and always audited with a before/after diff.
    pub async fn update_role(
        &self,
        acting_admin: &Principal,
        principal_id: Uuid,
        new_role: Role,
        origin: &RequestOrigin,
    ) -> ApiResult<Principal> {
        if acting_admin.role != Role::Admin {
            return Err(ApiError::Authorization(
                crate::domain::DenyReason::InsufficientRole,
            ));
        }
        let mut principal = self.load(principal_id).await?;
        let previous_role = principal.role;
        principal.role = new_role;
        principal.updated_at = chrono::Utc::now();
        self.principals
            .update(&principal)
            .await
            .map_err(|e| ApiError::System(format!("principal update failed: {e}")))?;

        self.recorder
            .record(
                AuditEvent::new(AuditEventKind::RoleChanged, origin.clone())
                    .by(acting_admin.id)
                    .on(ResourceType::Account, principal.id)
                    .with_diff(
                        Some(serde_json::json!({"role": previous_role.as_str()})),
                        Some(serde_json::json!({"role": new_role.as_str()})),
                    ),
            )
            .await;
        Ok(principal)
    }

    async fn load(&self, principal_id: Uuid) -> ApiResult<Principal> {
        self.principals
            .find_by_id(principal_id)
            .await
            .map_err(|e| ApiError::System(format!("principal lookup failed: {e}")))?
            .ok_or_else(|| ApiError::NotFound("principal".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuditFilter, PageRequest};
    use crate::store::MemoryStore;
    use std::time::Duration;

    fn service(store: &Arc<MemoryStore>) -> AuthService {
        let recorder = AuditTrailRecorder::new(store.clone(), Duration::from_millis(200));
        let tokens = Arc::new(TokenService::new(
            b"test-secret".to_vec(),
            Duration::from_secs(7 * 86_400),
            store.clone(),
        ));
        AuthService::new(store.clone(), tokens, recorder)
    }

    fn origin() -> RequestOrigin {
        RequestOrigin::new("203.0.113.7", "test-client/1.0")
    }

    #[test]
    fn credential_round_trip() {
        let stored = hash_credential("correct horse battery");
        assert!(verify_credential("correct horse battery", &stored));
        assert!(!verify_credential("wrong password", &stored));
        assert!(!verify_credential("correct horse battery", "garbage"));
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(hash_credential("same input"), hash_credential("same input"));
    }

    #[tokio::test]
    async fn login_succeeds_and_is_audited() -> ApiResult<()> {
        let store = Arc::new(MemoryStore::new());
        let auth = service(&store);
        let principal = auth
            .register(
                RegisterRequest {
                    email: "maria@example.com".to_string(),
                    display_name: "Maria".to_string(),
                    password: "segredo-forte".to_string(),
                },
                &origin(),
            )
            .await?;

        let token = auth
            .login(
                LoginRequest {
                    email: "maria@example.com".to_string(),
                    password: "segredo-forte".to_string(),
                },
                &origin(),
            )
            .await?;
        assert!(!token.is_empty());

        let recorder = AuditTrailRecorder::new(store.clone(), Duration::from_millis(200));
        let page = recorder
            .query(
                &AuditFilter {
                    principal_id: Some(principal.id),
                    kind: Some(AuditEventKind::LoginSuccess),
                    ..Default::default()
                },
                PageRequest::default(),
            )
            .await?;
        assert_eq!(page.total, 1);
        Ok(())
    }

    #[tokio::test]
    async fn failed_login_for_unknown_email_audits_null_principal() -> ApiResult<()> {
        let store = Arc::new(MemoryStore::new());
        let auth = service(&store);

        let err = auth
            .login(
                LoginRequest {
                    email: "nobody@example.com".to_string(),
                    password: "irrelevant1".to_string(),
                },
                &origin(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), 401);

        let recorder = AuditTrailRecorder::new(store.clone(), Duration::from_millis(200));
        let page = recorder
            .query(
                &AuditFilter {
                    kind: Some(AuditEventKind::LoginFailure),
                    ..Default::default()
                },
                PageRequest::default(),
            )
            .await?;
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].principal_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn password_change_invalidates_old_tokens() -> ApiResult<()> {
        let store = Arc::new(MemoryStore::new());
        let auth = service(&store);
        let principal = auth
            .register(
                RegisterRequest {
                    email: "joao@example.com".to_string(),
                    display_name: "Joao".to_string(),
                    password: "senha-antiga".to_string(),
                },
                &origin(),
            )
            .await?;

        let tokens = TokenService::new(
            b"test-secret".to_vec(),
            Duration::from_secs(7 * 86_400),
            store.clone(),
        );
        let old_token = tokens.issue(&principal);
        assert!(tokens.verify(&old_token).await.is_ok());

        auth.change_password(principal.id, "senha-antiga", "senha-nova-1", &origin())
            .await?;

        assert_eq!(
            tokens.verify(&old_token).await,
            Err(crate::service::token::VerifyError::PrincipalRotated)
        );
        Ok(())
    }

    #[tokio::test]
    async fn role_update_requires_admin_and_records_diff() -> ApiResult<()> {
        let store = Arc::new(MemoryStore::new());
        let auth = service(&store);
        let patient = auth
            .register(
                RegisterRequest {
                    email: "ana@example.com".to_string(),
                    display_name: "Ana".to_string(),
                    password: "senha-segura".to_string(),
                },
                &origin(),
            )
            .await?;

        let not_admin = Principal::new(Role::Doctor, "d@example.com", "Dr", "v1$00$00".into());
        assert!(auth
            .update_role(&not_admin, patient.id, Role::Secretary, &origin())
            .await
            .is_err());

        let admin = Principal::new(Role::Admin, "a@example.com", "Admin", "v1$00$00".into());
        let updated = auth
            .update_role(&admin, patient.id, Role::Secretary, &origin())
            .await?;
        assert_eq!(updated.role, Role::Secretary);

        let recorder = AuditTrailRecorder::new(store.clone(), Duration::from_millis(200));
        let page = recorder
            .query(
                &AuditFilter {
                    kind: Some(AuditEventKind::RoleChanged),
                    ..Default::default()
                },
                PageRequest::default(),
            )
            .await?;
        assert_eq!(page.total, 1);
        assert_eq!(
            page.items[0].detail["before"]["role"],
            serde_json::json!("patient")
        );
        Ok(())
    }
}

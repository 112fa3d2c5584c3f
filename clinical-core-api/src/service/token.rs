//! Session token issue/verify. Tokens are HMAC-SHA256-signed, base64url
//! claims carrying principal id, role, issue/expiry instants and the
//! principal's rotation marker. A password change bumps the marker, which
//! invalidates every previously issued token without a blacklist.

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Principal, Role};
use crate::error::{ApiError, AuthenticationError};
use crate::store::PrincipalStore;

type HmacSha256 = Hmac<Sha256>;

/// Tolerated clock skew between issuer and verifier.
const LEEWAY: chrono::Duration = chrono::Duration::seconds(5);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyError {
    #[error("token expired")]
    Expired,
    /// Tampered signature, malformed shape, or a principal that no
    /// longer exists; all collapse to one variant.
    #[error("token invalid")]
    Invalid,
    /// Signed under a rotation marker that has since changed.
    #[error("token rotated")]
    PrincipalRotated,
}

impl From<VerifyError> for ApiError {
    fn from(error: VerifyError) -> Self {
        ApiError::Authentication(match error {
            VerifyError::Expired => AuthenticationError::ExpiredToken,
            VerifyError::Invalid => AuthenticationError::InvalidToken,
            VerifyError::PrincipalRotated => AuthenticationError::PrincipalRotated,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    pub sub: Uuid,
    pub role: Role,
    #[serde(rename = "gen")]
    pub generation: i64,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn issued_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.iat, 0).single().unwrap_or_default()
    }
}

pub struct TokenService {
    secret: Vec<u8>,
    ttl: Duration,
    principals: Arc<dyn PrincipalStore>,
}

impl TokenService {
    pub fn new(secret: Vec<u8>, ttl: Duration, principals: Arc<dyn PrincipalStore>) -> Self {
        Self {
            secret,
            ttl,
            principals,
        }
    }

    /// Issue a token for the principal, valid from now for the fixed
    /// lifetime, signed under the principal's current rotation marker.
    pub fn issue(&self, principal: &Principal) -> String {
        self.issue_at(principal, Utc::now())
    }

    pub(crate) fn issue_at(&self, principal: &Principal, now: DateTime<Utc>) -> String {
        let claims = TokenClaims {
            sub: principal.id,
            role: principal.role,
            generation: principal.token_generation,
            iat: now.timestamp(),
            exp: (now + chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::days(7)))
                .timestamp(),
        };
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap_or_default());
        let signature = URL_SAFE_NO_PAD.encode(self.sign(payload.as_bytes()));
        format!("{payload}.{signature}")
    }

    /// HMAC accepts keys of any length, so construction only fails on a
    /// broken backend; an empty signature can never verify, which keeps
    /// even that path fail-closed.
    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        match HmacSha256::new_from_slice(&self.secret) {
            Ok(mut mac) => {
                mac.update(payload);
                mac.finalize().into_bytes().to_vec()
            }
            Err(_) => Vec::new(),
        }
    }

    /// Verify shape, signature and validity window, then re-fetch the
    /// principal: a token for a deleted or anonymized principal is
    /// `Invalid`, one signed under a stale rotation marker is
    /// `PrincipalRotated`.
    pub async fn verify(&self, token: &str) -> Result<TokenClaims, VerifyError> {
        self.verify_at(token, Utc::now()).await
    }

    pub(crate) async fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, VerifyError> {
        let (payload, signature) = token.split_once('.').ok_or(VerifyError::Invalid)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| VerifyError::Invalid)?;

        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| VerifyError::Invalid)?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).map_err(|_| VerifyError::Invalid)?;

        let claims: TokenClaims = serde_json::from_slice(
            &URL_SAFE_NO_PAD
                .decode(payload)
                .map_err(|_| VerifyError::Invalid)?,
        )
        .map_err(|_| VerifyError::Invalid)?;

        // Not yet valid (clock skew beyond leeway) reads as invalid, not
        // expired.
        if claims.iat > (now + LEEWAY).timestamp() {
            return Err(VerifyError::Invalid);
        }
        if claims.exp < (now - LEEWAY).timestamp() {
            return Err(VerifyError::Expired);
        }

        let principal = self
            .principals
            .find_by_id(claims.sub)
            .await
            .map_err(|_| VerifyError::Invalid)?
            .ok_or(VerifyError::Invalid)?;
        if principal.anonymized {
            return Err(VerifyError::Invalid);
        }
        if principal.token_generation != claims.generation {
            return Err(VerifyError::PrincipalRotated);
        }
        Ok(claims)
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value.strip_prefix("Bearer ").map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, PrincipalStore as _};

    async fn setup() -> (Arc<MemoryStore>, TokenService, Principal) {
        let store = Arc::new(MemoryStore::new());
        let principal = Principal::new(Role::Doctor, "d@example.com", "Dr Test", "v1$00$00".into());
        store.create(&principal).await.unwrap();
        let service = TokenService::new(
            b"test-secret".to_vec(),
            Duration::from_secs(7 * 86_400),
            store.clone(),
        );
        (store, service, principal)
    }

    #[tokio::test]
    async fn round_trip_preserves_identity_and_role() {
        let (_store, service, principal) = setup().await;
        let token = service.issue(&principal);
        let claims = service.verify(&token).await.unwrap();
        assert_eq!(claims.sub, principal.id);
        assert_eq!(claims.role, Role::Doctor);
    }

    #[tokio::test]
    async fn expired_token_is_rejected_as_expired() {
        let (_store, service, principal) = setup().await;
        let issued = Utc::now() - chrono::Duration::days(8);
        let token = service.issue_at(&principal, issued);
        assert_eq!(service.verify(&token).await, Err(VerifyError::Expired));
    }

    #[tokio::test]
    async fn future_issued_at_is_rejected() {
        let (_store, service, principal) = setup().await;
        let token = service.issue_at(&principal, Utc::now() + chrono::Duration::minutes(10));
        assert_eq!(service.verify(&token).await, Err(VerifyError::Invalid));
    }

    #[tokio::test]
    async fn tampered_payload_is_invalid() {
        let (_store, service, principal) = setup().await;
        let token = service.issue(&principal);
        let (payload, signature) = token.split_once('.').unwrap();
        let mut forged_payload = payload.to_string();
        forged_payload.replace_range(0..1, if payload.starts_with('A') { "B" } else { "A" });
        let forged = format!("{forged_payload}.{signature}");
        assert_eq!(service.verify(&forged).await, Err(VerifyError::Invalid));
    }

    #[tokio::test]
    async fn rotation_marker_change_invalidates_outstanding_tokens() {
        let (store, service, mut principal) = setup().await;
        let token = service.issue(&principal);

        principal.token_generation += 1;
        store.update(&principal).await.unwrap();

        assert_eq!(
            service.verify(&token).await,
            Err(VerifyError::PrincipalRotated)
        );
        // A token issued after the rotation verifies again.
        let fresh = service.issue(&principal);
        assert!(service.verify(&fresh).await.is_ok());
    }

    #[tokio::test]
    async fn token_for_unknown_principal_is_invalid() {
        let (_store, service, _principal) = setup().await;
        let ghost = Principal::new(Role::Patient, "g@example.com", "Ghost", "v1$00$00".into());
        let token = service.issue(&ghost);
        assert_eq!(service.verify(&token).await, Err(VerifyError::Invalid));
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Basic abc"), None);
    }
}

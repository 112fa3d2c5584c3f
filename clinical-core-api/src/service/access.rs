//! The access decision engine: every handler consults this one function
//! instead of carrying its own role checks. The engine is a pure decision
//! function over its inputs apart from the read-only assignment lookup;
//! it does not audit (callers report the decision to the recorder) and it
//! never errors, so denial is always handled as data.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::domain::{Decision, DenyReason, Operation, OperationScope, Principal, ResourceRef, Role};
use crate::store::RelationshipStore;

pub struct AccessDecisionEngine {
    relationships: Arc<dyn RelationshipStore>,
    store_timeout: Duration,
}

impl AccessDecisionEngine {
    pub fn new(relationships: Arc<dyn RelationshipStore>, store_timeout: Duration) -> Self {
        Self {
            relationships,
            store_timeout,
        }
    }

    /// Evaluate the request against the rules, first match wins:
    ///
    /// 1. no principal and a non-public operation: unauthenticated;
    /// 2. admin: allowed unconditionally (callers still audit sensitive
    ///    admin reads);
    /// 3. secretary on medical content: denied before the role-set check
    ///    so the internal reason is stable regardless of role lists;
    /// 4. role not in the operation's allowed set: insufficient role;
    /// 5. self-scoped: target owner must be the principal;
    /// 6. patient on clinical data: owner must be the principal;
    /// 7. doctor on clinical data: an active assignment must exist at
    ///    evaluation time, re-validated against the store on every call;
    /// 8. administrative scope: allowed once the role set passed;
    ///    anything else: no matching rule.
    ///
    /// A malformed descriptor (non-public operation without a role set,
    /// scoped operation without a target) is a programming error surfaced
    /// as `Deny(Misconfigured)`. A relationship-store failure or timeout
    /// is `Deny(StoreUnavailable)` — fail-closed, never an implicit
    /// allow.
    pub async fn authorize(
        &self,
        principal: Option<&Principal>,
        operation: &Operation,
        target: Option<&ResourceRef>,
    ) -> Decision {
        if matches!(operation.scope, OperationScope::Public) {
            return Decision::Allow;
        }

        let principal = match principal {
            Some(principal) => principal,
            None => return Decision::Deny(DenyReason::Unauthenticated),
        };

        if principal.role == Role::Admin {
            return Decision::Allow;
        }

        if principal.role == Role::Secretary && operation.medical_sensitive {
            return Decision::Deny(DenyReason::SecretaryMedicalRestricted);
        }

        if operation.allowed_roles.is_empty() {
            warn!(operation = operation.name, "operation descriptor has no role set");
            return Decision::Deny(DenyReason::Misconfigured);
        }
        if !operation.allowed_roles.contains(&principal.role) {
            return Decision::Deny(DenyReason::InsufficientRole);
        }

        match operation.scope {
            OperationScope::Public => Decision::Allow,
            OperationScope::SelfOnly => match target {
                Some(target) if target.owner_patient_id == principal.id => Decision::Allow,
                Some(_) => Decision::Deny(DenyReason::NotSelf),
                None => {
                    warn!(operation = operation.name, "self-scoped operation without a target");
                    Decision::Deny(DenyReason::Misconfigured)
                }
            },
            OperationScope::PatientClinicalData => {
                let target = match target {
                    Some(target) => target,
                    None => {
                        warn!(operation = operation.name, "clinical operation without a target");
                        return Decision::Deny(DenyReason::Misconfigured);
                    }
                };
                match principal.role {
                    Role::Patient => {
                        if target.owner_patient_id == principal.id {
                            Decision::Allow
                        } else {
                            Decision::Deny(DenyReason::NotOwnData)
                        }
                    }
                    Role::Doctor => self.check_assignment(principal.id, target.owner_patient_id).await,
                    _ => Decision::Deny(DenyReason::NoMatchingRule),
                }
            }
            OperationScope::Administrative => Decision::Allow,
        }
    }

    /// One bounded round trip to the relationship store. Errors and
    /// timeouts both resolve to a denial.
    async fn check_assignment(&self, doctor_id: uuid::Uuid, patient_id: uuid::Uuid) -> Decision {
        let lookup = self.relationships.active_assignment(doctor_id, patient_id);
        match tokio::time::timeout(self.store_timeout, lookup).await {
            Ok(Ok(true)) => Decision::Allow,
            Ok(Ok(false)) => Decision::Deny(DenyReason::DoctorNotAssigned),
            Ok(Err(error)) => {
                warn!(%doctor_id, %patient_id, %error, "assignment lookup failed, denying");
                Decision::Deny(DenyReason::StoreUnavailable)
            }
            Err(_) => {
                warn!(%doctor_id, %patient_id, "assignment lookup timed out, denying");
                Decision::Deny(DenyReason::StoreUnavailable)
            }
        }
    }
}

use serde::{Deserialize, Serialize};

/// Outcome of an access check. Denial is an expected outcome handled as
/// data, never an error or panic path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(*reason),
        }
    }
}

/// Specific denial reasons. Recorded in audit entries and logs; collapsed
/// to a generic 403 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    Unauthenticated,
    InsufficientRole,
    NotSelf,
    NotOwnData,
    DoctorNotAssigned,
    SecretaryMedicalRestricted,
    /// The operation descriptor itself was malformed. A programming
    /// error, reported as a denial rather than a crash.
    Misconfigured,
    /// An authorization-relevant lookup failed or timed out. Fail-closed:
    /// never resolve ambiguity to Allow.
    StoreUnavailable,
    NoMatchingRule,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::Unauthenticated => "unauthenticated",
            DenyReason::InsufficientRole => "insufficient_role",
            DenyReason::NotSelf => "not_self",
            DenyReason::NotOwnData => "not_own_data",
            DenyReason::DoctorNotAssigned => "doctor_not_assigned",
            DenyReason::SecretaryMedicalRestricted => "secretary_medical_restricted",
            DenyReason::Misconfigured => "misconfigured",
            DenyReason::StoreUnavailable => "store_unavailable",
            DenyReason::NoMatchingRule => "no_matching_rule",
        }
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

use super::resource::ResourceType;
use super::role::Role;

/// How an operation relates its caller to the target record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationScope {
    /// No authentication required (login, registration).
    Public,
    /// The caller may only act on their own account or profile.
    SelfOnly,
    /// The target is a patient's clinical data; ownership and assignment
    /// rules apply.
    PatientClinicalData,
    /// Administrative, non-medical data (scheduling, contact info).
    Administrative,
}

/// Descriptor of a role-gated operation, evaluated by the access engine.
///
/// Constructed through the named constructors below so the set of
/// operations and their tags live in one place; handlers never assemble
/// ad hoc role checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub scope: OperationScope,
    pub allowed_roles: &'static [Role],
    pub resource_type: ResourceType,
    /// Reads of sensitive operations are audited even though they change
    /// nothing.
    pub sensitive: bool,
    /// Medical content: a secretary is barred from this operation no
    /// matter how it is otherwise scoped. Free-text clinical fields are
    /// medical-sensitive by default; secretary visibility is an explicit
    /// allow-list of constructors with this flag off.
    pub medical_sensitive: bool,
}

impl Operation {
    const fn new(
        name: &'static str,
        scope: OperationScope,
        allowed_roles: &'static [Role],
        resource_type: ResourceType,
        sensitive: bool,
        medical_sensitive: bool,
    ) -> Self {
        Self {
            name,
            scope,
            allowed_roles,
            resource_type,
            sensitive,
            medical_sensitive,
        }
    }

    pub const fn login() -> Self {
        Self::new("auth.login", OperationScope::Public, &[], ResourceType::Account, false, false)
    }

    pub const fn view_own_profile() -> Self {
        Self::new(
            "auth.profile",
            OperationScope::SelfOnly,
            &[Role::Patient, Role::Doctor, Role::Secretary, Role::Admin],
            ResourceType::Profile,
            false,
            false,
        )
    }

    pub const fn list_patients() -> Self {
        Self::new(
            "patients.list",
            OperationScope::Administrative,
            &[Role::Admin, Role::Secretary, Role::Doctor],
            ResourceType::Profile,
            false,
            false,
        )
    }

    pub const fn read_prescription() -> Self {
        Self::new(
            "prescriptions.read",
            OperationScope::PatientClinicalData,
            &[Role::Patient, Role::Doctor, Role::Admin],
            ResourceType::Prescription,
            true,
            true,
        )
    }

    pub const fn create_prescription() -> Self {
        Self::new(
            "prescriptions.create",
            OperationScope::PatientClinicalData,
            &[Role::Doctor],
            ResourceType::Prescription,
            true,
            true,
        )
    }

    pub const fn read_exam() -> Self {
        Self::new(
            "exams.read",
            OperationScope::PatientClinicalData,
            &[Role::Patient, Role::Doctor, Role::Admin],
            ResourceType::Exam,
            true,
            true,
        )
    }

    pub const fn read_mood_entry() -> Self {
        Self::new(
            "mood_entries.read",
            OperationScope::PatientClinicalData,
            &[Role::Patient, Role::Doctor, Role::Admin],
            ResourceType::MoodEntry,
            true,
            true,
        )
    }

    pub const fn read_clinical_note() -> Self {
        Self::new(
            "clinical_notes.read",
            OperationScope::PatientClinicalData,
            &[Role::Patient, Role::Doctor, Role::Admin],
            ResourceType::ClinicalNote,
            true,
            true,
        )
    }

    pub const fn create_clinical_note() -> Self {
        Self::new(
            "clinical_notes.create",
            OperationScope::PatientClinicalData,
            &[Role::Doctor],
            ResourceType::ClinicalNote,
            true,
            true,
        )
    }

    /// Scheduling only; the appointment's free-text clinical notes are
    /// reachable solely through `read_clinical_note`.
    pub const fn create_appointment() -> Self {
        Self::new(
            "appointments.create",
            OperationScope::Administrative,
            &[Role::Secretary, Role::Admin],
            ResourceType::Appointment,
            false,
            false,
        )
    }

    pub const fn reassign_doctor() -> Self {
        Self::new(
            "assignments.update",
            OperationScope::Administrative,
            &[Role::Secretary, Role::Admin],
            ResourceType::Account,
            false,
            false,
        )
    }

    pub const fn export_personal_data() -> Self {
        Self::new(
            "lgpd.export",
            OperationScope::SelfOnly,
            &[Role::Patient, Role::Doctor, Role::Secretary, Role::Admin],
            ResourceType::Account,
            true,
            false,
        )
    }

    pub const fn schedule_account_deletion() -> Self {
        Self::new(
            "lgpd.delete_account",
            OperationScope::SelfOnly,
            &[Role::Patient, Role::Doctor, Role::Secretary, Role::Admin],
            ResourceType::Account,
            true,
            false,
        )
    }

    pub const fn change_consent() -> Self {
        Self::new(
            "lgpd.consent",
            OperationScope::SelfOnly,
            &[Role::Patient, Role::Doctor, Role::Secretary, Role::Admin],
            ResourceType::ConsentRecord,
            true,
            false,
        )
    }

    pub const fn query_audit_logs() -> Self {
        Self::new(
            "admin.audit_logs",
            OperationScope::Administrative,
            &[Role::Admin],
            ResourceType::AuditLog,
            false,
            false,
        )
    }

    pub const fn update_role() -> Self {
        Self::new(
            "admin.update_role",
            OperationScope::Administrative,
            &[Role::Admin],
            ResourceType::Account,
            true,
            false,
        )
    }
}

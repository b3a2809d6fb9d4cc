//! Role-scoped mutation rights.
//!
//! [`can`] is a pure predicate consulted before any storage write. Roles are
//! a closed union, so adding a role fails to compile until every arm below
//! is updated.

use serde::{Deserialize, Serialize};

use super::{Error, Role, User, UserId};

/// Authenticated caller as supplied by the inbound auth gate.
///
/// The core trusts this value verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}

/// Operation an actor attempts against a target user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Insert a clinical entry into a patient's ledger.
    AppendLedgerEntry,
    /// Patch a document path into an existing ledger entry.
    AttachDocument,
    /// Store an alert on a patient record.
    PushPatientAlert,
    /// Flag a patient-held alert as dismissed.
    DismissPatientAlert,
    /// Edit personal profile fields.
    UpdateProfile,
    /// Read a patient's ledger or fall history.
    ReadPatientRecord,
    /// Assign or unassign a doctor.
    ManageCareGraph,
    /// Report a fall on behalf of the target patient.
    ReportFall,
    /// Read or clear a doctor's own inbox and derived views.
    ManageDoctorInbox,
}

impl Action {
    /// Human-readable verb used in denial reasons.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::AppendLedgerEntry => "append ledger entries",
            Self::AttachDocument => "attach documents",
            Self::PushPatientAlert => "push patient alerts",
            Self::DismissPatientAlert => "dismiss patient alerts",
            Self::UpdateProfile => "update profile fields",
            Self::ReadPatientRecord => "read patient records",
            Self::ManageCareGraph => "manage care links",
            Self::ReportFall => "report falls",
            Self::ManageDoctorInbox => "manage doctor alerts",
        }
    }
}

/// The parts of a target record the policy looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    pub id: UserId,
    pub doctor_ref: Option<UserId>,
}

impl Subject {
    /// A subject known only by id, before its record has been loaded.
    pub const fn unresolved(id: UserId) -> Self {
        Self {
            id,
            doctor_ref: None,
        }
    }
}

impl From<&User> for Subject {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            doctor_ref: user.doctor_ref(),
        }
    }
}

fn deny(actor: &Actor, action: Action, target: Subject) -> Error {
    Error::unauthorized(format!(
        "{} may not {} for user {}",
        actor.role,
        action.describe(),
        target.id
    ))
}

fn is_assigned_doctor(actor: &Actor, target: Subject) -> bool {
    target.doctor_ref == Some(actor.id)
}

fn is_self(actor: &Actor, target: Subject) -> bool {
    target.id == actor.id
}

/// Decide whether `actor` may perform `action` on `target`.
///
/// # Errors
/// Returns an `unauthorized` [`Error`] naming the role and action when denied.
///
/// # Examples
/// ```
/// use carelink::domain::{Action, Actor, CredentialHash, Email, Profile, Role, User, UserId, can};
///
/// let patient = User::new(
///     UserId::random(),
///     Email::new("ada@example.test").unwrap(),
///     CredentialHash::new("salt$hash"),
///     Profile::named("Ada").unwrap(),
///     Role::Patient,
/// );
/// let stranger = Actor::new(UserId::random(), Role::Doctor);
/// assert!(can(&stranger, Action::AppendLedgerEntry, &patient).is_err());
/// ```
pub fn can(actor: &Actor, action: Action, target: &User) -> Result<(), Error> {
    can_on(actor, action, Subject::from(target))
}

/// [`can`] against a subject that may not have been loaded yet.
pub fn can_on(actor: &Actor, action: Action, target: Subject) -> Result<(), Error> {
    let allowed = match (actor.role, action) {
        // Document attachment is the one clinical write reserved to doctors.
        (Role::Admin, Action::AttachDocument) => false,
        (Role::Admin, _) => true,

        (
            Role::Doctor,
            Action::AppendLedgerEntry
            | Action::AttachDocument
            | Action::PushPatientAlert
            | Action::DismissPatientAlert
            | Action::ReadPatientRecord,
        ) => is_assigned_doctor(actor, target),
        (Role::Doctor, Action::ManageDoctorInbox) => is_self(actor, target),
        (Role::Doctor, Action::UpdateProfile | Action::ManageCareGraph | Action::ReportFall) => {
            false
        }

        (
            Role::Patient,
            Action::UpdateProfile | Action::ReportFall | Action::ReadPatientRecord,
        ) => is_self(actor, target),
        (
            Role::Patient,
            Action::AppendLedgerEntry
            | Action::AttachDocument
            | Action::PushPatientAlert
            | Action::DismissPatientAlert
            | Action::ManageCareGraph
            | Action::ManageDoctorInbox,
        ) => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(deny(actor, action, target))
    }
}

//! User records: identity, role, care links, ledger, and inbox.
//!
//! A user's role is a closed union. Role-specific link state lives in
//! [`CareLinks`], so a doctor can never carry a `doctor_ref` and a patient can
//! never carry `patient_refs`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Alert, AlertId, EntryId, MedicalHistoryEntry, UserId};

/// Role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Patient,
    Admin,
}

impl Role {
    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Doctor => "doctor",
            Self::Patient => "patient",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'; expected doctor, patient, or admin")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "doctor" => Ok(Self::Doctor),
            "patient" => Ok(Self::Patient),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Validation errors for user fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email must contain a local part and a domain separated by '@'")]
    MalformedEmail,
    #[error("name must not be empty")]
    EmptyName,
}

/// Operation attempted on a user whose role does not support it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("user {id} is a {actual}, expected a {expected}")]
pub struct RoleMismatch {
    pub id: UserId,
    pub expected: Role,
    pub actual: Role,
}

/// Normalised, unique email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and lowercase an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        let mut parts = trimmed.split('@');
        let well_formed = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
        );
        if !well_formed || trimmed.chars().any(char::is_whitespace) {
            return Err(UserValidationError::MalformedEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Opaque stored credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialHash(String);

impl CredentialHash {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialHash(..)")
    }
}

/// Personal profile fields. Patients may edit their own; doctors never may.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Profile {
    /// Build a profile with only a name set.
    pub fn named(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        Ok(Self {
            name,
            age: None,
            gender: None,
            image: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Partial profile update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Profile {
    /// Apply an update, rejecting a blank name without touching other fields.
    pub fn apply(&mut self, update: ProfileUpdate) -> Result<(), UserValidationError> {
        if let Some(name) = update.name.as_deref() {
            if name.trim().is_empty() {
                return Err(UserValidationError::EmptyName);
            }
        }
        if let Some(name) = update.name {
            self.name = name;
        }
        if update.age.is_some() {
            self.age = update.age;
        }
        if update.gender.is_some() {
            self.gender = update.gender;
        }
        if update.image.is_some() {
            self.image = update.image;
        }
        Ok(())
    }
}

/// Role-specific care-graph state. Both sides are weak, id-only references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CareLinks {
    /// Patients this doctor is responsible for, without duplicates.
    Doctor { patient_refs: Vec<UserId> },
    /// The patient's assigned doctor.
    Patient { doctor_ref: Option<UserId> },
    Admin,
}

impl CareLinks {
    fn for_role(role: Role) -> Self {
        match role {
            Role::Doctor => Self::Doctor {
                patient_refs: Vec::new(),
            },
            Role::Patient => Self::Patient { doctor_ref: None },
            Role::Admin => Self::Admin,
        }
    }

    fn role(&self) -> Role {
        match self {
            Self::Doctor { .. } => Role::Doctor,
            Self::Patient { .. } => Role::Patient,
            Self::Admin => Role::Admin,
        }
    }
}

/// Application user of any role.
///
/// ## Invariants
/// - `medical_history` is newest-first and only ever grows at the head.
/// - `revision` is owned by the persistence adapter; services pass the value
///   they read back as the expected revision on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: Email,
    credential: CredentialHash,
    profile: Profile,
    links: CareLinks,
    medical_history: Vec<MedicalHistoryEntry>,
    alerts: Vec<Alert>,
    last_known_location: Option<String>,
    revision: u64,
}

impl User {
    /// Build a new user with empty links, ledger, and inbox.
    pub fn new(
        id: UserId,
        email: Email,
        credential: CredentialHash,
        profile: Profile,
        role: Role,
    ) -> Self {
        Self {
            id,
            email,
            credential,
            profile,
            links: CareLinks::for_role(role),
            medical_history: Vec::new(),
            alerts: Vec::new(),
            last_known_location: None,
            revision: 0,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn credential(&self) -> &CredentialHash {
        &self.credential
    }

    pub fn set_credential(&mut self, credential: CredentialHash) {
        self.credential = credential;
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut Profile {
        &mut self.profile
    }

    pub fn name(&self) -> &str {
        self.profile.name()
    }

    pub fn role(&self) -> Role {
        self.links.role()
    }

    pub fn links(&self) -> &CareLinks {
        &self.links
    }

    /// Persistence revision last read for this record.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Stamp the stored revision. Intended for persistence adapters.
    #[must_use]
    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    fn mismatch(&self, expected: Role) -> RoleMismatch {
        RoleMismatch {
            id: self.id,
            expected,
            actual: self.role(),
        }
    }

    /// Fail unless the user holds `expected`.
    pub fn require_role(&self, expected: Role) -> Result<(), RoleMismatch> {
        if self.role() == expected {
            Ok(())
        } else {
            Err(self.mismatch(expected))
        }
    }

    /// Assigned doctor. Always `None` for non-patients.
    pub fn doctor_ref(&self) -> Option<UserId> {
        match &self.links {
            CareLinks::Patient { doctor_ref } => *doctor_ref,
            CareLinks::Doctor { .. } | CareLinks::Admin => None,
        }
    }

    /// Assigned patients. Always empty for non-doctors.
    pub fn patient_refs(&self) -> &[UserId] {
        match &self.links {
            CareLinks::Doctor { patient_refs } => patient_refs,
            CareLinks::Patient { .. } | CareLinks::Admin => &[],
        }
    }

    pub fn set_doctor_ref(&mut self, doctor: Option<UserId>) -> Result<(), RoleMismatch> {
        match &mut self.links {
            CareLinks::Patient { doctor_ref } => {
                *doctor_ref = doctor;
                Ok(())
            }
            CareLinks::Doctor { .. } | CareLinks::Admin => Err(self.mismatch(Role::Patient)),
        }
    }

    /// Add a patient reference. Returns `false` when it was already present.
    pub fn add_patient_ref(&mut self, patient: UserId) -> Result<bool, RoleMismatch> {
        match &mut self.links {
            CareLinks::Doctor { patient_refs } => {
                if patient_refs.contains(&patient) {
                    return Ok(false);
                }
                patient_refs.push(patient);
                Ok(true)
            }
            CareLinks::Patient { .. } | CareLinks::Admin => Err(self.mismatch(Role::Doctor)),
        }
    }

    /// Remove a patient reference. Returns `false` when it was absent.
    pub fn remove_patient_ref(&mut self, patient: UserId) -> Result<bool, RoleMismatch> {
        match &mut self.links {
            CareLinks::Doctor { patient_refs } => {
                let before = patient_refs.len();
                patient_refs.retain(|id| *id != patient);
                Ok(patient_refs.len() != before)
            }
            CareLinks::Patient { .. } | CareLinks::Admin => Err(self.mismatch(Role::Doctor)),
        }
    }

    /// Ledger, newest first.
    pub fn medical_history(&self) -> &[MedicalHistoryEntry] {
        &self.medical_history
    }

    /// Insert an entry at the head of a patient's ledger.
    pub fn prepend_entry(&mut self, entry: MedicalHistoryEntry) -> Result<(), RoleMismatch> {
        self.require_role(Role::Patient)?;
        self.medical_history.insert(0, entry);
        Ok(())
    }

    pub fn entry_mut(&mut self, id: EntryId) -> Option<&mut MedicalHistoryEntry> {
        self.medical_history.iter_mut().find(|entry| entry.id() == id)
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn push_alert(&mut self, alert: Alert) {
        self.alerts.push(alert);
    }

    pub fn alert_mut(&mut self, id: AlertId) -> Option<&mut Alert> {
        self.alerts.iter_mut().find(|alert| alert.id() == id)
    }

    /// Physically remove one alert.
    pub fn remove_alert(&mut self, id: AlertId) -> Option<Alert> {
        let index = self.alerts.iter().position(|alert| alert.id() == id)?;
        Some(self.alerts.remove(index))
    }

    /// Physically remove every alert regardless of classification.
    pub fn clear_alerts(&mut self) -> usize {
        let removed = self.alerts.len();
        self.alerts.clear();
        removed
    }

    pub fn last_known_location(&self) -> Option<&str> {
        self.last_known_location.as_deref()
    }

    pub fn set_last_known_location(&mut self, location: impl Into<String>) {
        self.last_known_location = Some(location.into());
    }
}

#[cfg(test)]
#[path = "user_tests.rs"]
mod tests;

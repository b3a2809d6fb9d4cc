//! OpenAPI schema definitions and response views for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! and the [`UserView`] projection that keeps credential hashes and revisions
//! off the wire.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Alert, CareLinks, Role, User, UserId};

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = ErrorCode)]
pub enum ErrorCodeSchema {
    /// The payload failed validation.
    #[schema(rename = "validation")]
    Validation,
    /// No session accompanies the request.
    #[schema(rename = "unauthenticated")]
    Unauthenticated,
    /// The actor may not perform the action.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// A referenced record does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with current state.
    #[schema(rename = "conflict")]
    Conflict,
    /// Writes committed but a collaborator failed afterwards.
    #[schema(rename = "partial_failure")]
    PartialFailure,
    /// A backing service is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "not_found")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "patient 3fa85f64-5717-4562-b3fc-2c963f66afa6 not found")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "5b0f6a0e-4f53-4a55-9d2c-3b8f7c1e2d4a")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Alert`].
#[derive(ToSchema)]
#[schema(as = Alert, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct AlertSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(example = "Fall detected for Ada at Room 4")]
    message: String,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    dismissed: bool,
    #[schema(value_type = Option<String>, format = Uuid)]
    related_patient: Option<String>,
}

/// OpenAPI schema for [`crate::domain::ComputedAlert`].
#[derive(ToSchema)]
#[schema(as = ComputedAlert, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ComputedAlertSchema {
    #[schema(value_type = String, format = Uuid)]
    patient_id: String,
    #[schema(example = "Abnormal vital Heart rate: Danger")]
    message: String,
    /// `high` or `critical`.
    #[schema(example = "critical")]
    severity: String,
}

/// OpenAPI schema for [`crate::domain::PatientAlertView`].
#[derive(ToSchema)]
#[schema(as = PatientAlert, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PatientAlertSchema {
    #[schema(value_type = String, format = Uuid)]
    patient_id: String,
    patient_name: String,
    #[schema(value_type = String, format = Uuid)]
    id: String,
    message: String,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    dismissed: bool,
}

/// OpenAPI schema for [`crate::domain::Vital`].
#[derive(ToSchema)]
#[schema(as = Vital, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct VitalSchema {
    #[schema(example = "Heart rate")]
    name: String,
    #[schema(example = "128 bpm")]
    value: String,
    /// One of `Normal`, `High`, `Low`, `OK`, `Danger`.
    #[schema(example = "High")]
    status: String,
    document: Option<String>,
}

/// OpenAPI schema for [`crate::domain::Disease`].
#[derive(ToSchema)]
#[schema(as = Disease, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct DiseaseSchema {
    #[schema(example = "Hypertension")]
    name: String,
    document: Option<String>,
}

/// OpenAPI schema for [`crate::domain::MedicalHistoryEntry`].
#[derive(ToSchema)]
#[schema(as = MedicalHistoryEntry, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct MedicalHistoryEntrySchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(value_type = String, format = DateTime)]
    recorded_at: String,
    vitals: Vec<VitalSchema>,
    diseases: Vec<DiseaseSchema>,
    notes: String,
    documents: Vec<String>,
    #[schema(example = "Normal")]
    status: String,
}

/// OpenAPI schema for [`crate::domain::FallEvent`].
#[derive(ToSchema)]
#[schema(as = FallEvent, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FallEventSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(value_type = String, format = Uuid)]
    patient_id: String,
    email: String,
    #[schema(example = "Room 4")]
    location: String,
    #[schema(value_type = String, format = Uuid)]
    doctor_id: String,
    #[schema(value_type = String, format = DateTime)]
    reported_at: String,
}

/// Public projection of a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[schema(value_type = String, format = Uuid)]
    pub id: UserId,
    #[schema(example = "ada@example.test")]
    pub email: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(value_type = String, example = "patient")]
    pub role: Role,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub doctor_ref: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<String>>)]
    pub patient_refs: Option<Vec<UserId>>,
    pub last_known_location: Option<String>,
    #[schema(value_type = Vec<AlertSchema>)]
    pub alerts: Vec<Alert>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        let (doctor_ref, patient_refs) = match user.links() {
            CareLinks::Patient { doctor_ref } => (*doctor_ref, None),
            CareLinks::Doctor { patient_refs } => (None, Some(patient_refs.clone())),
            CareLinks::Admin => (None, None),
        };
        let profile = user.profile();
        Self {
            id: user.id(),
            email: user.email().as_str().to_owned(),
            name: profile.name().to_owned(),
            role: user.role(),
            age: profile.age,
            gender: profile.gender.clone(),
            image: profile.image.clone(),
            doctor_ref,
            patient_refs,
            last_known_location: user.last_known_location().map(str::to_owned),
            alerts: user.alerts().to_vec(),
        }
    }
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

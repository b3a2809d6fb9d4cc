//! Medical history ledger handlers.
//!
//! ```text
//! GET  /api/v1/patients/{id}/history
//! POST /api/v1/patients/{id}/history
//! POST /api/v1/patients/{id}/history/{entryId}/documents
//! POST /api/v1/patients/{id}/history/{entryId}/documents/upload?fileName=&vitalIndex=
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{AttachDocumentRequest, AttachDocumentResponse, UploadDocumentRequest};
use crate::domain::{
    DiseaseDraft, DocumentPlacement, EntryDraft, EntryId, MedicalHistoryEntry, UserId, VitalDraft,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, MedicalHistoryEntrySchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_id};

const PATIENT_ID: FieldName = FieldName::new("patientId");
const ENTRY_ID: FieldName = FieldName::new("entryId");
const FILE_PATH: FieldName = FieldName::new("filePath");
const FILE_NAME: FieldName = FieldName::new("fileName");

/// A vital reading in an entry request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VitalRequest {
    #[schema(example = "Heart rate")]
    pub name: String,
    #[schema(example = "128 bpm")]
    pub value: String,
    /// `Normal`, `High`, `Low`, `OK`, or `Danger`; defaults to `Normal`.
    #[schema(example = "High")]
    pub status: Option<String>,
}

/// A diagnosis in an entry request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseRequest {
    #[schema(example = "Hypertension")]
    pub name: String,
}

/// Body of `POST /patients/{id}/history`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryRequest {
    #[serde(default)]
    pub vitals: Vec<VitalRequest>,
    #[serde(default)]
    pub diseases: Vec<DiseaseRequest>,
    #[serde(default)]
    pub notes: String,
    /// Overall entry status; defaults to `Normal`.
    pub status: Option<String>,
}

impl From<EntryRequest> for EntryDraft {
    fn from(value: EntryRequest) -> Self {
        Self {
            vitals: value
                .vitals
                .into_iter()
                .map(|v| VitalDraft {
                    name: v.name,
                    value: v.value,
                    status: v.status,
                })
                .collect(),
            diseases: value
                .diseases
                .into_iter()
                .map(|d| DiseaseDraft { name: d.name })
                .collect(),
            notes: value.notes,
            status: value.status,
        }
    }
}

/// Body of the attach-by-path endpoint.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachDocumentBody {
    /// Stable path returned by a storage service.
    pub file_path: Option<String>,
    /// Vital to attach to; out-of-range indexes fall back to the entry.
    pub vital_index: Option<usize>,
}

/// Query string of the upload endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct UploadParams {
    /// Original file name; letters, digits, `.`, `-`, and `_` only.
    pub file_name: Option<String>,
    pub vital_index: Option<usize>,
}

/// Outcome of a document attachment.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachDocumentView {
    pub path: String,
    /// `{"target":"vital","index":0}` or `{"target":"entry"}`.
    #[schema(value_type = Object)]
    pub placement: DocumentPlacement,
    #[schema(value_type = MedicalHistoryEntrySchema)]
    pub entry: MedicalHistoryEntry,
}

impl From<AttachDocumentResponse> for AttachDocumentView {
    fn from(value: AttachDocumentResponse) -> Self {
        Self {
            path: value.path,
            placement: value.placement,
            entry: value.entry,
        }
    }
}

fn parse_entry_path(path: (String, String)) -> ApiResult<(UserId, EntryId)> {
    let (patient, entry) = path;
    Ok((parse_id(&patient, PATIENT_ID)?, parse_id(&entry, ENTRY_ID)?))
}

/// List a patient's ledger, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}/history",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Ledger entries", body = [MedicalHistoryEntrySchema]),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "Unknown patient", body = ErrorSchema)
    ),
    tags = ["medical-history"],
    operation_id = "listHistory"
)]
#[get("/patients/{id}/history")]
pub async fn list_history(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<MedicalHistoryEntry>>> {
    let actor = session.require_actor()?;
    let patient_id: UserId = parse_id(&path.into_inner(), PATIENT_ID)?;
    let entries = state.history_query.list_history(&actor, &patient_id).await?;
    Ok(web::Json(entries))
}

/// Append an entry at the head of a patient's ledger.
#[utoipa::path(
    post,
    path = "/api/v1/patients/{id}/history",
    params(("id" = String, Path, description = "Patient id")),
    request_body = EntryRequest,
    responses(
        (status = 201, description = "Full ledger after the append", body = [MedicalHistoryEntrySchema]),
        (status = 400, description = "Invalid status value", body = ErrorSchema),
        (status = 403, description = "Not the assigned doctor", body = ErrorSchema),
        (status = 404, description = "Unknown patient", body = ErrorSchema),
        (status = 409, description = "Concurrent update", body = ErrorSchema)
    ),
    tags = ["medical-history"],
    operation_id = "appendEntry"
)]
#[post("/patients/{id}/history")]
pub async fn append_entry(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<EntryRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor()?;
    let patient_id: UserId = parse_id(&path.into_inner(), PATIENT_ID)?;
    let entries = state
        .history
        .append_entry(&actor, &patient_id, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(entries))
}

/// Attach an already-stored document path to an entry.
#[utoipa::path(
    post,
    path = "/api/v1/patients/{id}/history/{entryId}/documents",
    params(
        ("id" = String, Path, description = "Patient id"),
        ("entryId" = String, Path, description = "Entry id")
    ),
    request_body = AttachDocumentBody,
    responses(
        (status = 200, description = "Document attached", body = AttachDocumentView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not the assigned doctor", body = ErrorSchema),
        (status = 404, description = "Unknown patient or entry", body = ErrorSchema)
    ),
    tags = ["medical-history"],
    operation_id = "attachDocument"
)]
#[post("/patients/{id}/history/{entry_id}/documents")]
pub async fn attach_document(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
    payload: web::Json<AttachDocumentBody>,
) -> ApiResult<web::Json<AttachDocumentView>> {
    let actor = session.require_actor()?;
    let (patient_id, entry_id) = parse_entry_path(path.into_inner())?;
    let AttachDocumentBody {
        file_path,
        vital_index,
    } = payload.into_inner();
    let file_path = file_path.ok_or_else(|| missing_field_error(FILE_PATH))?;
    let response = state
        .history
        .attach_document(
            &actor,
            AttachDocumentRequest {
                patient_id,
                entry_id,
                vital_index,
                file_path,
            },
        )
        .await?;
    Ok(web::Json(response.into()))
}

/// Store an uploaded document and attach it to an entry.
#[utoipa::path(
    post,
    path = "/api/v1/patients/{id}/history/{entryId}/documents/upload",
    params(
        ("id" = String, Path, description = "Patient id"),
        ("entryId" = String, Path, description = "Entry id"),
        UploadParams
    ),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Document stored and attached", body = AttachDocumentView),
        (status = 400, description = "Invalid file name", body = ErrorSchema),
        (status = 403, description = "Not the assigned doctor", body = ErrorSchema),
        (status = 404, description = "Unknown patient or entry", body = ErrorSchema)
    ),
    tags = ["medical-history"],
    operation_id = "uploadDocument"
)]
#[post("/patients/{id}/history/{entry_id}/documents/upload")]
pub async fn upload_document(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
    query: web::Query<UploadParams>,
    body: web::Bytes,
) -> ApiResult<web::Json<AttachDocumentView>> {
    let actor = session.require_actor()?;
    let (patient_id, entry_id) = parse_entry_path(path.into_inner())?;
    let UploadParams {
        file_name,
        vital_index,
    } = query.into_inner();
    let file_name = file_name.ok_or_else(|| missing_field_error(FILE_NAME))?;
    let response = state
        .history
        .upload_document(
            &actor,
            UploadDocumentRequest {
                patient_id,
                entry_id,
                vital_index,
                file_name,
                bytes: body.to_vec(),
            },
        )
        .await?;
    Ok(web::Json(response.into()))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_history)
        .service(append_entry)
        .service(attach_document)
        .service(upload_document);
}

#[cfg(test)]
#[path = "medical_history_tests.rs"]
mod tests;

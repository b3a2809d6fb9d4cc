//! Driving ports for the medical history ledger.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Actor, DocumentPlacement, EntryDraft, EntryId, Error, MedicalHistoryEntry, UserId,
};

/// Attach an already stored document path to a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachDocumentRequest {
    pub patient_id: UserId,
    pub entry_id: EntryId,
    /// Target vital; falls back to the entry's document list when it does not
    /// identify an existing vital.
    pub vital_index: Option<usize>,
    pub file_path: String,
}

/// Store raw bytes through the document store, then attach the stored path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDocumentRequest {
    pub patient_id: UserId,
    pub entry_id: EntryId,
    pub vital_index: Option<usize>,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Outcome of attaching a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachDocumentResponse {
    pub path: String,
    pub placement: DocumentPlacement,
    pub entry: MedicalHistoryEntry,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MedicalHistoryCommand: Send + Sync {
    /// Validate `draft`, insert it at the head of the ledger, and return the
    /// whole ledger, newest first.
    async fn append_entry(
        &self,
        actor: &Actor,
        patient_id: &UserId,
        draft: EntryDraft,
    ) -> Result<Vec<MedicalHistoryEntry>, Error>;

    /// Patch a document path into an existing entry. Assigned doctor only.
    async fn attach_document(
        &self,
        actor: &Actor,
        request: AttachDocumentRequest,
    ) -> Result<AttachDocumentResponse, Error>;

    /// Authorise, store the bytes, then attach the resulting path.
    async fn upload_document(
        &self,
        actor: &Actor,
        request: UploadDocumentRequest,
    ) -> Result<AttachDocumentResponse, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MedicalHistoryQuery: Send + Sync {
    /// Ledger for a patient, newest first.
    async fn list_history(
        &self,
        actor: &Actor,
        patient_id: &UserId,
    ) -> Result<Vec<MedicalHistoryEntry>, Error>;
}

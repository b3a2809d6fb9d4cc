//! Medical history ledger service.
//!
//! Entries are inserted at the head of the patient's ledger and never removed.
//! The only in-place change is patching document paths into an existing
//! entry. Uploads write the bytes first and discard them again when the
//! follow-up attach is refused.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    AttachDocumentRequest, AttachDocumentResponse, DocumentStore, DocumentStoreError,
    MedicalHistoryCommand, MedicalHistoryQuery, UploadDocumentRequest, UserRepository,
};
use crate::domain::user_store::{UserStore, role_not_found};
use crate::domain::{
    Action, Actor, ClinicalValidationError, EntryDraft, EntryId, Error, MedicalHistoryEntry, Role,
    User, UserId, can,
};

fn map_clinical_error(error: ClinicalValidationError) -> Error {
    Error::validation(error.to_string()).with_details(json!({ "field": error.field() }))
}

fn map_document_error(error: DocumentStoreError) -> Error {
    match error {
        DocumentStoreError::InvalidName { message } => {
            Error::validation(format!("invalid document name: {message}"))
                .with_details(json!({ "field": "fileName" }))
        }
        DocumentStoreError::Io { message } => {
            Error::internal(format!("document store error: {message}"))
        }
    }
}

fn entry_not_found(patient_id: &UserId, entry_id: &EntryId) -> Error {
    Error::not_found(format!("entry {entry_id} not found for patient {patient_id}"))
}

/// Ledger service implementing the medical history driving ports.
pub struct MedicalHistoryService<R, D> {
    users: UserStore<R>,
    documents: Arc<D>,
    clock: Arc<dyn Clock>,
}

impl<R, D> Clone for MedicalHistoryService<R, D> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            documents: Arc::clone(&self.documents),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R: UserRepository, D: DocumentStore> MedicalHistoryService<R, D> {
    pub fn new(repo: Arc<R>, documents: Arc<D>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users: UserStore::new(repo),
            documents,
            clock,
        }
    }

    /// Load a patient and check `action` against it.
    async fn gate(&self, actor: &Actor, action: Action, patient_id: &UserId) -> Result<User, Error> {
        let patient = self.users.load_with_role(patient_id, Role::Patient).await?;
        can(actor, action, &patient)?;
        Ok(patient)
    }
}

#[async_trait]
impl<R: UserRepository, D: DocumentStore> MedicalHistoryCommand for MedicalHistoryService<R, D> {
    async fn append_entry(
        &self,
        actor: &Actor,
        patient_id: &UserId,
        draft: EntryDraft,
    ) -> Result<Vec<MedicalHistoryEntry>, Error> {
        self.gate(actor, Action::AppendLedgerEntry, patient_id).await?;
        let entry = MedicalHistoryEntry::from_draft(EntryId::random(), self.clock.utc(), draft)
            .map_err(map_clinical_error)?;
        let entry_id = entry.id();

        let (patient, ()) = self
            .users
            .mutate(patient_id, |patient| {
                can(actor, Action::AppendLedgerEntry, patient)?;
                patient.prepend_entry(entry.clone()).map_err(role_not_found)
            })
            .await?;

        info!(
            patient_id = %patient_id,
            entry_id = %entry_id,
            actor_id = %actor.id,
            ledger_len = patient.medical_history().len(),
            "ledger entry appended"
        );
        Ok(patient.medical_history().to_vec())
    }

    async fn attach_document(
        &self,
        actor: &Actor,
        request: AttachDocumentRequest,
    ) -> Result<AttachDocumentResponse, Error> {
        let AttachDocumentRequest {
            patient_id,
            entry_id,
            vital_index,
            file_path,
        } = request;
        if file_path.trim().is_empty() {
            return Err(Error::validation("file path must not be empty")
                .with_details(json!({ "field": "filePath" })));
        }
        self.gate(actor, Action::AttachDocument, &patient_id).await?;

        let (_, (placement, entry)) = self
            .users
            .mutate(&patient_id, |patient| {
                can(actor, Action::AttachDocument, patient)?;
                let entry = patient
                    .entry_mut(entry_id)
                    .ok_or_else(|| entry_not_found(&patient_id, &entry_id))?;
                let placement = entry.attach_document(vital_index, file_path.clone());
                Ok((placement, entry.clone()))
            })
            .await?;

        info!(
            patient_id = %patient_id,
            entry_id = %entry_id,
            ?placement,
            "document attached"
        );
        Ok(AttachDocumentResponse {
            path: file_path,
            placement,
            entry,
        })
    }

    async fn upload_document(
        &self,
        actor: &Actor,
        request: UploadDocumentRequest,
    ) -> Result<AttachDocumentResponse, Error> {
        let patient = self
            .gate(actor, Action::AttachDocument, &request.patient_id)
            .await?;
        if !patient
            .medical_history()
            .iter()
            .any(|entry| entry.id() == request.entry_id)
        {
            return Err(entry_not_found(&request.patient_id, &request.entry_id));
        }

        let path = self
            .documents
            .store(
                &request.patient_id,
                &request.entry_id,
                &request.file_name,
                request.bytes,
            )
            .await
            .map_err(map_document_error)?;

        let attached = self
            .attach_document(
                actor,
                AttachDocumentRequest {
                    patient_id: request.patient_id,
                    entry_id: request.entry_id,
                    vital_index: request.vital_index,
                    file_path: path.clone(),
                },
            )
            .await;
        if attached.is_err() {
            // Nothing references the stored bytes once the attach is refused.
            if let Err(err) = self.documents.discard(&path).await {
                warn!(path = %path, error = %err, "orphaned document could not be discarded");
            }
        }
        attached
    }
}

#[async_trait]
impl<R: UserRepository, D: DocumentStore> MedicalHistoryQuery for MedicalHistoryService<R, D> {
    async fn list_history(
        &self,
        actor: &Actor,
        patient_id: &UserId,
    ) -> Result<Vec<MedicalHistoryEntry>, Error> {
        let patient = self
            .gate(actor, Action::ReadPatientRecord, patient_id)
            .await?;
        Ok(patient.medical_history().to_vec())
    }
}

#[cfg(test)]
#[path = "medical_history_tests.rs"]
mod tests;
